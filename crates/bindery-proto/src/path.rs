//! Route paths of the binding protocol and URL joining.

/// Status query path.
pub const USER: &str = "user";
/// Bind action path.
pub const BIND: &str = "user/bind";
/// Unbind action path.
pub const UNBIND: &str = "user/unbind";
/// Resource status path.
pub const RESOURCE: &str = "resource";

/// Path of a named resource action, e.g. `resource/on`.
pub fn resource_action(action: &str) -> String {
    format!("{RESOURCE}/{action}")
}

/// Join a relative protocol path onto a controller's base URL.
///
/// The base may or may not carry a trailing slash; the relative path may or
/// may not carry a leading one. Exactly one slash separates them.
pub fn join(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    format!("{base}/{relative}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_slashes() {
        assert_eq!(join("http://h:8001", BIND), "http://h:8001/user/bind");
        assert_eq!(join("http://h:8001/", "/user/unbind"), "http://h:8001/user/unbind");
        assert_eq!(join("http://h/ctl/", USER), "http://h/ctl/user");
    }

    #[test]
    fn resource_action_path() {
        assert_eq!(resource_action("on"), "resource/on");
    }
}
