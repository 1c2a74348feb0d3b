mod brm_error;
mod lock_error;
mod storage_error;

pub use brm_error::{BrmError, BrmResult};
pub use lock_error::LockError;
pub use storage_error::StorageError;
