// Domain-layer modules and shared errors/models
pub mod roi_calculator {
    pub use crate::roi_calculator::*;
}

pub mod form_input {
    pub use crate::form_input::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
