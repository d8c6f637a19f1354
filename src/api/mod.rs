// Thin namespace wrapper for HTTP-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod admin_handlers {
    pub use crate::admin_handlers::*;
}

pub mod router {
    pub use crate::router::*;
}

pub mod session {
    pub use crate::session::*;
}
