pub mod health;
pub mod portal_client;
pub mod quiz;
pub mod validation;
