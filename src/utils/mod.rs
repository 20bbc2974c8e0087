pub mod storage_key;
pub mod validation;
