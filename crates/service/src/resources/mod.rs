//! The three collections exposed by the site API.

pub mod board_member;
pub mod impact_goal;
pub mod naming_opportunity;

pub use board_member::{BoardMember, BoardMemberInput, BoardMembers};
pub use impact_goal::{ImpactGoal, ImpactGoalInput, ImpactGoals};
pub use naming_opportunity::{amount_value, NamingOpportunities, NamingOpportunity, NamingOpportunityInput};
