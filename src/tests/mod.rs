#[cfg(test)]
pub mod mock_portal;
