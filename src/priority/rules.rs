//! Path-convention rules for tier and category classification

use crate::resource::{PriorityTier, ResourceCategory};

/// Directories whose contents are always critical
pub const CRITICAL_DIRS: &[&str] = &["types", "session-state"];
/// Top-level checklist document, always critical
pub const CHECKLIST_FILE: &str = "CHECKLIST.md";
/// Directories whose contents are high priority
pub const HIGH_DIRS: &[&str] = &["monitoring", "components"];
/// Assistant/editor tool configuration directories (high priority)
pub const TOOL_CONFIG_DIRS: &[&str] = &[".ai", ".aider", ".continue", ".cursor", ".windsurf", ".copilot"];
/// Extensions treated as documentation (high priority)
pub const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "rst", "adoc", "txt"];
/// Directories whose contents are medium priority
pub const MEDIUM_DIRS: &[&str] = &["routes", "docs", "scripts"];

const TEST_DIRS: &[&str] = &["tests", "test", "__tests__", "spec"];
const API_DIRS: &[&str] = &["api", "routes", "handlers", "endpoints"];
const CONFIG_EXTENSIONS: &[&str] = &["json", "toml", "yaml", "yml", "ini", "env", "cfg"];

/// Split a path into its directory segments and file name
fn split(path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let file = segments.pop().unwrap_or("");
    (segments, file)
}

fn extension(file: &str) -> Option<&str> {
    match file.rfind('.') {
        Some(0) | None => None,
        Some(i) => Some(&file[i + 1..]),
    }
}

fn under_any(dirs: &[&str], conventions: &[&str]) -> bool {
    dirs.iter().any(|d| conventions.contains(d))
}

/// Assign a priority tier from path conventions alone
pub fn classify_path(path: &str) -> PriorityTier {
    let (dirs, file) = split(path);

    if under_any(&dirs, CRITICAL_DIRS) || (dirs.is_empty() && file == CHECKLIST_FILE) {
        return PriorityTier::Critical;
    }

    let is_doc = extension(file).is_some_and(|ext| DOC_EXTENSIONS.contains(&ext));
    if under_any(&dirs, HIGH_DIRS) || under_any(&dirs, TOOL_CONFIG_DIRS) || is_doc {
        return PriorityTier::High;
    }

    if under_any(&dirs, MEDIUM_DIRS) {
        return PriorityTier::Medium;
    }

    PriorityTier::Low
}

/// Derive a content category from path shape.
///
/// Paths matching no specific convention are general source modules and
/// are reported as components.
pub fn categorize_path(path: &str) -> ResourceCategory {
    let (dirs, file) = split(path);
    let ext = extension(file);

    if under_any(&dirs, TEST_DIRS)
        || file.contains(".test.")
        || file.contains(".spec.")
        || file.starts_with("test_")
        || file.ends_with("_test.rs")
    {
        return ResourceCategory::Tests;
    }
    if dirs.contains(&"types") || file.ends_with(".d.ts") || file.starts_with("types.") {
        return ResourceCategory::Types;
    }
    if dirs.contains(&"components") {
        return ResourceCategory::Components;
    }
    if under_any(&dirs, API_DIRS) {
        return ResourceCategory::Api;
    }
    if dirs.contains(&"docs") || ext.is_some_and(|e| DOC_EXTENSIONS.contains(&e)) {
        return ResourceCategory::Documentation;
    }
    if ext.is_some_and(|e| CONFIG_EXTENSIONS.contains(&e))
        || file.contains(".config.")
        || file.starts_with('.')
    {
        return ResourceCategory::Config;
    }

    ResourceCategory::Components
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_paths() {
        assert_eq!(classify_path("src/types/user.ts"), PriorityTier::Critical);
        assert_eq!(classify_path("types/index.d.ts"), PriorityTier::Critical);
        assert_eq!(classify_path("session-state/current.json"), PriorityTier::Critical);
        assert_eq!(classify_path("CHECKLIST.md"), PriorityTier::Critical);
    }

    #[test]
    fn test_nested_checklist_is_not_critical() {
        // Only the top-level checklist is special; nested it is plain docs
        assert_eq!(classify_path("docs/CHECKLIST.md"), PriorityTier::High);
    }

    #[test]
    fn test_high_paths() {
        assert_eq!(classify_path("src/components/Button.tsx"), PriorityTier::High);
        assert_eq!(classify_path("src/monitoring/metrics.ts"), PriorityTier::High);
        assert_eq!(classify_path(".cursor/rules.json"), PriorityTier::High);
        assert_eq!(classify_path("README.md"), PriorityTier::High);
        assert_eq!(classify_path("docs/guide.md"), PriorityTier::High);
    }

    #[test]
    fn test_medium_paths() {
        assert_eq!(classify_path("src/routes/users.ts"), PriorityTier::Medium);
        assert_eq!(classify_path("docs/diagram.svg"), PriorityTier::Medium);
        assert_eq!(classify_path("scripts/deploy.sh"), PriorityTier::Medium);
    }

    #[test]
    fn test_low_paths() {
        assert_eq!(classify_path("src/utils/format.ts"), PriorityTier::Low);
        assert_eq!(classify_path("package.json"), PriorityTier::Low);
        // A file merely named like a convention is not "under" it
        assert_eq!(classify_path("src/types.ts"), PriorityTier::Low);
    }

    #[test]
    fn test_classification_is_case_sensitive() {
        assert_eq!(classify_path("src/Types/user.ts"), PriorityTier::Low);
    }

    #[test]
    fn test_categories() {
        assert_eq!(categorize_path("src/types/user.ts"), ResourceCategory::Types);
        assert_eq!(categorize_path("src/global.d.ts"), ResourceCategory::Types);
        assert_eq!(categorize_path("src/components/Nav.tsx"), ResourceCategory::Components);
        assert_eq!(categorize_path("src/api/users.ts"), ResourceCategory::Api);
        assert_eq!(categorize_path("src/routes/index.ts"), ResourceCategory::Api);
        assert_eq!(categorize_path("docs/setup.md"), ResourceCategory::Documentation);
        assert_eq!(categorize_path("tsconfig.json"), ResourceCategory::Config);
        assert_eq!(categorize_path(".eslintrc"), ResourceCategory::Config);
        assert_eq!(categorize_path("src/app.test.ts"), ResourceCategory::Tests);
        assert_eq!(categorize_path("tests/integration.rs"), ResourceCategory::Tests);
        assert_eq!(categorize_path("src/lib/helpers.ts"), ResourceCategory::Components);
    }
}
