pub mod db;
pub mod identity;
pub mod plan_llm;

pub use db::DbAdapter;
pub use identity::PasswordIdentityAdapter;
pub use plan_llm::OpenAiPlanAdapter;
