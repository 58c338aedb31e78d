//! Route table and documentation commands

use crate::display::format_route_table;
use crate::error::{AdminError, AdminResult};
use crate::site::AdminSite;

/// Print every route the site serves
pub fn handle_routes_command(mut site: AdminSite) -> AdminResult<()> {
    let mount_point = site.settings().mount_point();
    let routes = site.build_routes();
    print!("{}", format_route_table(&routes, &mount_point));
    Ok(())
}

/// Print the generated documentation for one model
pub fn handle_docs_command(site: &AdminSite, model: &str) -> AdminResult<()> {
    let model = model.to_lowercase();
    let docs = site.docs_for(&model).ok_or_else(|| {
        let known: Vec<&str> = site
            .registered_models()
            .iter()
            .map(|m| m.model_name.as_str())
            .collect();
        AdminError::NotRegistered(format!("{} (registered: {})", model, known.join(", ")))
    })?;

    println!("{}", docs);
    Ok(())
}
