pub mod account;
pub mod achievement;
pub mod common;
pub mod expense;
pub mod goal;

pub use account::{User, UserAccount};
pub use achievement::{achievement_catalog, Achievement, AchievementId};
pub use common::{Amounted, Displayable, Identifiable, NamedEntity, YearMonth};
pub use expense::{Expense, ExpenseCategory, ExpenseInput, ExpensePatch};
pub use goal::{Contribution, Goal, GoalInput, GoalPatch};
