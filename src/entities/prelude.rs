pub use super::options::Entity as Options;
