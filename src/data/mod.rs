//! Persistence: pool setup and the lead/benefit/defaults stores.

pub mod db {
    pub use crate::db::*;
}

pub mod db_storage {
    pub use crate::db_storage::*;
}

pub mod csv_export {
    pub use crate::csv_export::*;
}
