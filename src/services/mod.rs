pub mod deadline_policy;
pub mod goal_service;
pub mod goal_traversal;
pub mod interchange;

pub use goal_service::GoalService;
pub use interchange::IcsScope;
