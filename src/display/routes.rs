//! Route table formatting

use crate::site::Route;

/// Format the route table with methods and the action each one runs
pub fn format_route_table(routes: &[Route], mount_point: &str) -> String {
    if routes.is_empty() {
        return "No routes registered.".to_string();
    }

    let paths: Vec<String> = routes
        .iter()
        .map(|r| format!("{}{}", mount_point, r.pattern))
        .collect();

    // Calculate column widths
    let path_width = paths.iter().map(|p| p.len()).max().unwrap_or(4).max(4);
    let name_width = routes
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<path_width$}  {:<name_width$}  {}\n",
        "Path",
        "Name",
        "Methods",
        path_width = path_width,
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<path_width$}  {:-<name_width$}  {:-<7}\n",
        "",
        "",
        "",
        path_width = path_width,
        name_width = name_width,
    ));

    for (route, path) in routes.iter().zip(&paths) {
        let methods: Vec<String> = route
            .methods
            .iter()
            .map(|(method, action)| format!("{}={}", method, action))
            .collect();

        output.push_str(&format!(
            "{:<path_width$}  {:<name_width$}  {}\n",
            path,
            route.name,
            methods.join(" "),
            path_width = path_width,
            name_width = name_width,
        ));
    }

    output.push_str(&format!("\n{} route(s)\n", routes.len()));
    output
}
