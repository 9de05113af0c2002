/// Router Module Index
///
/// Organizes the service's routes into access-segregated modules. Access control is
/// applied at the module level (via Axum layers) in `create_router`, so a handler can
/// never be mounted without the gate its module implies.

/// Routes reachable without a session: health probe and the navigation gate.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
pub mod authenticated;

/// Routes restricted to the 'admin' role.
pub mod admin;
