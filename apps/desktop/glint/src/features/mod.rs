//! Feature modules composed at startup.
//!
//! Each module contributes methods to the registry and subscribers to the
//! mailbox. Registration happens once, before dispatch begins; afterwards
//! both structures are read-only.

pub mod capture;
pub mod system;
pub mod window;

use crate::context::AppContext;

use rpc_core::hub::NotificationHub;
use rpc_core::rpc::MethodRegistry;

use std::sync::Arc;

pub fn register_methods(registry: &mut MethodRegistry, context: &Arc<AppContext>) {
    system::register(registry, context);
    window::register(registry, context);

    // Last, so the listing snapshot covers everything registered above.
    system::register_describe(registry);
}

pub fn register_subscribers(context: &Arc<AppContext>, hub: &Arc<NotificationHub>) {
    window::subscribe(context, hub);
    capture::subscribe(context, hub);
}
