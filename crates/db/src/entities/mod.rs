//! Database entities.

#![allow(missing_docs)]

pub mod academy;
pub mod category;
pub mod category_modification;
pub mod field;
pub mod group;
pub mod modification_type;
pub mod order;
pub mod product;
pub mod request_to_group;
pub mod ticket;
pub mod user;

pub use academy::Entity as Academy;
pub use category::Entity as Category;
pub use category_modification::Entity as CategoryModification;
pub use field::Entity as Field;
pub use group::Entity as Group;
pub use modification_type::Entity as ModificationType;
pub use order::Entity as Order;
pub use product::Entity as Product;
pub use request_to_group::Entity as RequestToGroup;
pub use ticket::Entity as Ticket;
pub use user::Entity as User;
