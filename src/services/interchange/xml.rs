//! The `<mango>` XML document: one nested `<goal>` element per goal.

use chrono::{Local, NaiveDate};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompletionWeight, Goal, DATE_FORMAT, MAX_COMPLETION};
use crate::domain::ports::GoalRepository;
use crate::services::goal_service::GoalService;

const ROOT_TAG: &str = "mango";
const GOAL_TAG: &str = "goal";
const INDENT: usize = 3;

enum Frame {
    Open(Goal),
    Close,
}

/// Serialize the whole goal tree.
pub async fn export_xml<R: GoalRepository>(service: &GoalService<R>) -> DomainResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new(ROOT_TAG)))?;

    let mut stack: Vec<Frame> = service.top_level_goals().await?.into_iter().rev().map(Frame::Open).collect();
    let mut written = 0usize;

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Open(goal) => {
                let children = service.get_children(goal.id).await?;
                let element = goal_element(&goal);
                written += 1;
                if children.is_empty() {
                    write(&mut writer, Event::Empty(element))?;
                } else {
                    write(&mut writer, Event::Start(element))?;
                    stack.push(Frame::Close);
                    stack.extend(children.into_iter().rev().map(Frame::Open));
                }
            }
            Frame::Close => write(&mut writer, Event::End(BytesEnd::new(GOAL_TAG)))?,
        }
    }

    write(&mut writer, Event::End(BytesEnd::new(ROOT_TAG)))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| DomainError::SerializationError(e.to_string()))?;
    xml.push('\n');
    debug!(goals = written, "goal tree serialized to XML");
    Ok(xml)
}

fn goal_element(goal: &Goal) -> BytesStart<'static> {
    let completion = goal.completion.to_string();
    let weight = goal.weight.value().to_string();
    let deadline = goal.deadline.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
    let timestamp = goal.created_on.format(DATE_FORMAT).to_string();

    let mut element = BytesStart::new(GOAL_TAG);
    element.push_attribute(("name", goal.name.as_str()));
    element.push_attribute(("description", goal.description.as_str()));
    element.push_attribute(("imageName", goal.image_name.as_str()));
    element.push_attribute(("completion", completion.as_str()));
    element.push_attribute(("weight", weight.as_str()));
    element.push_attribute(("deadline", deadline.as_str()));
    element.push_attribute(("timestamp", timestamp.as_str()));
    element
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> DomainResult<()> {
    writer.write_event(event).map_err(|e| DomainError::Io(e.to_string()))
}

/// A `<goal>` element, parsed and validated, at its nesting depth
/// (0 = top level).
#[derive(Debug)]
pub struct GoalRecord {
    pub depth: usize,
    pub goal: Goal,
}

/// Insert every goal of the document into the store, keeping its shape.
///
/// The whole document is parsed before the first insert, so a malformed
/// document leaves the store untouched. Returns the number of goals
/// imported.
pub async fn import_xml<R: GoalRepository>(service: &GoalService<R>, xml: &str) -> DomainResult<usize> {
    let records = parse_document(xml, Local::now().date_naive())?;
    insert_records(service, records).await
}

/// Replace the whole goal tree with the document's.
///
/// Existing goals are removed only once the document has parsed. Image
/// assets are kept so the document can reference them.
pub async fn replace_with_xml<R: GoalRepository>(service: &GoalService<R>, xml: &str) -> DomainResult<usize> {
    let records = parse_document(xml, Local::now().date_naive())?;
    service.clear(false).await?;
    insert_records(service, records).await
}

/// Insert parsed records in document order, rebuilding their nesting.
pub async fn insert_records<R: GoalRepository>(
    service: &GoalService<R>,
    records: Vec<GoalRecord>,
) -> DomainResult<usize> {
    let total = records.len();

    // New ids of the goals enclosing the current record, outermost first
    let mut parents: Vec<Uuid> = Vec::new();
    for GoalRecord { depth, mut goal } in records {
        parents.truncate(depth);
        if goal.has_image() && !service.images().exists(&goal.image_name).await? {
            warn!(image = %goal.image_name, "dropping reference to missing image");
            goal.image_name.clear();
        }
        let id = service.insert(goal, parents.last().copied()).await?;
        parents.push(id);
    }

    info!(goals = total, "goal tree imported from XML");
    Ok(total)
}

/// Parse the document into goal records in pre order.
///
/// `today` stands in for a missing or unreadable `timestamp`.
pub fn parse_document(xml: &str, today: NaiveDate) -> DomainResult<Vec<GoalRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut records = Vec::new();
    let mut root_seen = false;
    let mut root_open = false;
    let mut depth = 0usize;
    // Nesting level inside an element that is not a goal
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(_) if skip_depth > 0 => skip_depth += 1,
            Event::End(_) if skip_depth > 0 => skip_depth -= 1,
            Event::Empty(_) if skip_depth > 0 => {}
            Event::Start(_) | Event::Empty(_) if root_seen && !root_open => {
                return Err(DomainError::ParseError("Content after the root element".to_string()));
            }
            Event::Start(_) if !root_seen => {
                root_seen = true;
                root_open = true;
            }
            Event::Empty(_) if !root_seen => {
                root_seen = true;
            }
            Event::Start(e) if is_goal(&e) => {
                records.push(GoalRecord { depth, goal: parse_goal(&e, today)? });
                depth += 1;
            }
            Event::Empty(e) if is_goal(&e) => {
                records.push(GoalRecord { depth, goal: parse_goal(&e, today)? });
            }
            Event::Start(_) => skip_depth = 1,
            Event::End(_) if depth > 0 => depth -= 1,
            Event::End(_) => root_open = false,
            Event::Eof => break,
            _ => {}
        }
    }

    if root_open || depth > 0 || skip_depth > 0 {
        return Err(DomainError::ParseError("Unexpected end of document".to_string()));
    }
    if !root_seen {
        return Err(DomainError::ParseError("Document has no root element".to_string()));
    }
    Ok(records)
}

fn is_goal(element: &BytesStart<'_>) -> bool {
    element.name().as_ref().eq_ignore_ascii_case(GOAL_TAG.as_bytes())
}

fn parse_goal(element: &BytesStart<'_>, today: NaiveDate) -> DomainResult<Goal> {
    let mut goal = Goal::new("", "");
    goal.created_on = today;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| DomainError::ParseError(e.to_string()))?;
        let raw = attr.unescape_value()?;
        let value = raw.trim();
        match attr.key.as_ref() {
            b"name" => goal.name = raw.to_string(),
            b"description" => goal.description = raw.to_string(),
            b"imageName" => goal.image_name = value.to_string(),
            b"completion" => goal.completion = parse_completion(value)?,
            b"weight" => goal.weight = parse_weight(value)?,
            b"deadline" => goal.deadline = NaiveDate::parse_from_str(value, DATE_FORMAT).ok(),
            b"timestamp" => {
                goal.created_on = NaiveDate::parse_from_str(value, DATE_FORMAT).unwrap_or(today);
            }
            _ => {}
        }
    }
    Ok(goal)
}

fn parse_completion(value: &str) -> DomainResult<u8> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u8>()
        .ok()
        .filter(|c| *c <= MAX_COMPLETION)
        .ok_or_else(|| DomainError::ParseError(format!("Invalid completion: '{value}'")))
}

fn parse_weight(value: &str) -> DomainResult<CompletionWeight> {
    if value.is_empty() {
        return Ok(CompletionWeight::default());
    }
    value
        .parse::<u32>()
        .ok()
        .and_then(CompletionWeight::from_value)
        .ok_or_else(|| DomainError::ParseError(format!("Invalid weight: '{value}'")))
}
