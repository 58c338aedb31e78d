//! Request CLI command
//!
//! Sends one request through the demo site's router and prints the
//! response.

use clap::Args;
use serde_json::Value;

use crate::display::format_response;
use crate::error::{AdminError, AdminResult};
use crate::http::{Method, Request};
use crate::models::User;
use crate::site::AdminRouter;

/// Arguments describing one request
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, OPTIONS)
    pub method: String,

    /// Request path, optionally with a query string
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Acting user ID; anonymous when omitted
    #[arg(short, long)]
    pub user: Option<u64>,

    /// Permission code granted to the user (repeatable)
    #[arg(short, long = "perm")]
    pub perms: Vec<String>,

    /// Mark the user as staff
    #[arg(long)]
    pub staff: bool,

    /// Mark the user as a superuser
    #[arg(long)]
    pub superuser: bool,
}

impl RequestArgs {
    /// Build the request these arguments describe
    pub fn to_request(&self) -> AdminResult<Request> {
        let method: Method = self.method.parse()?;

        let data = match &self.data {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| AdminError::Config(format!("Invalid --data JSON: {}", e)))?,
            None => Value::Null,
        };

        Ok(Request::new(method, &self.path)
            .with_data(data)
            .with_user(self.to_user()))
    }

    fn to_user(&self) -> User {
        let Some(id) = self.user else {
            return User::anonymous();
        };

        let mut user = if self.superuser {
            User::superuser(id, format!("user{}", id))
        } else {
            User::new(id, format!("user{}", id))
        };
        if self.staff {
            user = user.staff();
        }
        user.with_permissions(self.perms.iter().cloned())
    }
}

/// Handle the request command
pub fn handle_request_command(router: &AdminRouter, args: RequestArgs) -> AdminResult<()> {
    let request = args.to_request()?;
    let response = router.handle(&request)?;
    print!("{}", format_response(&response));
    Ok(())
}
