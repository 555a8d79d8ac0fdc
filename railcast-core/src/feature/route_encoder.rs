use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{FeatureError, FeatureRow};

const ROUTE_COLUMN_PREFIX: &str = "route_";

/// one-hot encoding of route identity. columns are ordered by route name, so the
/// encoding does not depend on the order routes were first seen. columns are addressed
/// by name (`route_<id>`), and adding routes never changes the column of an existing route.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct RouteEncoder {
    routes: BTreeSet<String>,
}

impl RouteEncoder {
    pub fn new<I, S>(routes: I) -> RouteEncoder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut encoder = RouteEncoder::default();
        encoder.extend(routes);
        encoder
    }

    pub fn from_rows(rows: &[FeatureRow]) -> RouteEncoder {
        RouteEncoder::new(rows.iter().map(|r| r.route.as_str()))
    }

    /// adds any routes not yet known.
    pub fn extend<I, S>(&mut self, routes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for route in routes {
            self.routes.insert(route.as_ref().to_string());
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = &String> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn column_name(route: &str) -> String {
        format!("{ROUTE_COLUMN_PREFIX}{route}")
    }

    pub fn column_names(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| RouteEncoder::column_name(r))
            .collect_vec()
    }

    /// indicator vector for the route with a single 1.0 in the route's column.
    pub fn encode(&self, route: &str) -> Result<Vec<f64>, FeatureError> {
        if !self.routes.contains(route) {
            return Err(FeatureError::UnknownRoute(route.to_string()));
        }
        Ok(self
            .routes
            .iter()
            .map(|r| if r == route { 1.0 } else { 0.0 })
            .collect_vec())
    }
}
