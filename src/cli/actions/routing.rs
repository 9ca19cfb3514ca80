use crate::cli::{actions::print_json, globals::GlobalArgs};
use crate::router::{RouteDescriptor, Router, Target, ROUTES};
use anyhow::Result;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct NavigateArgs {
    pub globals: GlobalArgs,
    pub path: String,
}

/// Resolves a path through the route table and guard, as a browser
/// navigation would with the stored credentials.
///
/// # Errors
/// Returns an error if the store cannot be opened or redirects loop.
pub fn navigate(args: &NavigateArgs) -> Result<()> {
    let store = args.globals.open_store()?;
    let router = Router::new(store);
    let location = router.push(&args.path)?;

    print_json(&json!({
        "requested": args.path,
        "location": location,
        "notFound": location.is_not_found(),
    }))
}

fn describe(route: &RouteDescriptor) -> Value {
    let target = match route.target {
        Target::View(view) => json!({ "view": view }),
        Target::Redirect(_) => json!({ "redirect": true }),
    };
    json!({
        "path": route.path,
        "name": route.name,
        "target": target,
        "meta": route.meta,
    })
}

/// # Errors
/// Returns an error if the table cannot be written to stdout.
pub fn routes() -> Result<()> {
    let table: Vec<Value> = ROUTES.iter().map(describe).collect();
    print_json(&table)
}
