//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{id}', use [format_endpoint].

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
/// The route to create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to list a user's transactions (GET) or delete a single transaction (DELETE).
///
/// For GET requests `{id}` is the user ID, for DELETE requests it is the transaction ID.
/// Both share the one path so that the router sees a single parameter name.
pub const TRANSACTION: &str = "/api/transactions/{id}";
/// The route to get the balance, income and expenses of a user.
pub const TRANSACTION_SUMMARY: &str = "/api/transactions/summary/{user_id}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/transactions/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path contains a single parameter.
/// `value` is inserted as-is, callers are responsible for percent-encoding it.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl std::fmt::Display) -> String {
    let param_start = endpoint_path.find('{');
    let param_end = endpoint_path.find('}');

    match (param_start, param_end) {
        (Some(start), Some(end)) if start < end => {
            let param = &endpoint_path[start + 1..end];

            if param.is_empty() || !param.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
                return endpoint_path.to_string();
            }

            format!(
                "{}{}{}",
                &endpoint_path[..start],
                value,
                &endpoint_path[end + 1..]
            )
        }
        _ => endpoint_path.to_string(),
    }
}
