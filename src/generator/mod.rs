//! # Generator Module
//!
//! Consumers of the validated route table.
//!
//! Generators receive, per route, exactly what the registration gate derived:
//! HTTP method, path pattern, [`FuncInfo`], request schema and response
//! schema. They never re-validate anything. A caller-supplied blacklist of
//! {package, type, method} rules excludes routes from emitted output, matched
//! against each handler's [`FuncInfo`].
//!
//! The [`openapi`] submodule assembles and writes an OpenAPI 3.0 document;
//! target-language client emitters consume the same inputs and live outside
//! this crate.

pub mod openapi;

use crate::handler::FuncInfo;
use crate::router::BoundRoute;

/// One blacklist rule. An unset part matches anything, so
/// `BlacklistRule::type_name("EchoService")` excludes every method of that
/// service regardless of package.
#[derive(Debug, Clone, Default)]
pub struct BlacklistRule {
    pub package: Option<String>,
    pub type_name: Option<String>,
    pub method: Option<String>,
}

impl BlacklistRule {
    /// Rule matching every method of the named owner type.
    #[must_use]
    pub fn type_name(name: impl Into<String>) -> Self {
        BlacklistRule {
            type_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Rule matching one method of one owner type.
    #[must_use]
    pub fn method(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        BlacklistRule {
            type_name: Some(type_name.into()),
            method: Some(method.into()),
            ..Self::default()
        }
    }

    /// Whether this rule excludes the given handler.
    #[must_use]
    pub fn matches(&self, info: &FuncInfo) -> bool {
        fn part(rule: &Option<String>, actual: &str) -> bool {
            rule.as_deref().map_or(true, |r| r == actual)
        }
        part(&self.package, &info.package)
            && part(&self.type_name, &info.type_name)
            && part(&self.method, &info.method)
    }
}

/// Routes surviving the blacklist, in registration order.
#[must_use]
pub fn filter_routes<'a>(
    routes: &'a [BoundRoute],
    blacklist: &[BlacklistRule],
) -> Vec<&'a BoundRoute> {
    routes
        .iter()
        .filter(|route| {
            let info = route.handler.func_info();
            !blacklist.iter().any(|rule| rule.matches(info))
        })
        .collect()
}
