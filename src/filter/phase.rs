//! Phase pattern table
//!
//! Each known task phase maps to an include/exclude pattern pair and a
//! modification window. Unknown phases fall back to a broad default.

/// Patterns excluded in every phase
pub const BASE_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/target/**",
    "**/.git/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/*.lock",
    "**/*.min.js",
];

/// Window used when a phase does not define a tighter one
pub const DEFAULT_MODIFICATION_THRESHOLD_HOURS: u64 = 168;

/// Include/exclude patterns for a task phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePatterns {
    /// Canonical phase name (`"default"` for the fallback)
    pub phase: &'static str,
    pub include: &'static [&'static str],
    /// Phase-specific excludes, applied on top of [`BASE_EXCLUDES`]
    pub exclude: &'static [&'static str],
    pub modification_threshold_hours: u64,
}

impl PhasePatterns {
    /// All exclude patterns for this phase, base excludes first
    pub fn all_excludes(&self) -> impl Iterator<Item = &'static str> {
        BASE_EXCLUDES.iter().chain(self.exclude.iter()).copied()
    }

    /// Whether this is the fallback pattern pair
    pub fn is_default(&self) -> bool {
        self.phase == DEFAULT_PHASE.phase
    }
}

/// Fallback for unrecognized phases
pub const DEFAULT_PHASE: PhasePatterns = PhasePatterns {
    phase: "default",
    include: &["src/**", "lib/**", "docs/**", "*.md", "*.json", "*.toml"],
    exclude: &[],
    modification_threshold_hours: DEFAULT_MODIFICATION_THRESHOLD_HOURS,
};

const PHASES: &[PhasePatterns] = &[
    PhasePatterns {
        phase: "planning",
        include: &["*.md", "docs/**", "**/types/**", "**/*.d.ts", "*.json", "*.toml"],
        exclude: &["**/tests/**", "**/*.test.*", "**/*.spec.*"],
        modification_threshold_hours: DEFAULT_MODIFICATION_THRESHOLD_HOURS,
    },
    PhasePatterns {
        phase: "implementation",
        include: &["src/**", "lib/**", "*.md", "*.json", "*.toml"],
        exclude: &["docs/**"],
        modification_threshold_hours: 72,
    },
    PhasePatterns {
        phase: "testing",
        include: &[
            "src/**",
            "tests/**",
            "**/__tests__/**",
            "**/*.test.*",
            "**/*.spec.*",
            "*.json",
            "*.toml",
        ],
        exclude: &["docs/**"],
        modification_threshold_hours: 72,
    },
    PhasePatterns {
        phase: "debugging",
        include: &["src/**", "lib/**", "tests/**", "**/monitoring/**", "**/*.log"],
        exclude: &["docs/**"],
        modification_threshold_hours: 24,
    },
    PhasePatterns {
        phase: "review",
        include: &["src/**", "lib/**", "tests/**", "*.md", "docs/**"],
        exclude: &[],
        modification_threshold_hours: 72,
    },
    PhasePatterns {
        phase: "documentation",
        include: &["*.md", "docs/**", "**/*.md", "**/*.mdx", "src/**/index.*"],
        exclude: &[],
        modification_threshold_hours: DEFAULT_MODIFICATION_THRESHOLD_HOURS,
    },
    PhasePatterns {
        phase: "deployment",
        include: &["*.json", "*.toml", "*.yaml", "*.yml", "scripts/**", ".github/**", "Dockerfile"],
        exclude: &["src/**/*.test.*"],
        modification_threshold_hours: DEFAULT_MODIFICATION_THRESHOLD_HOURS,
    },
];

/// Look up the pattern pair for a phase.
///
/// Matching is case-insensitive on the trimmed name; unknown phases return
/// [`DEFAULT_PHASE`].
pub fn patterns_for_phase(phase: &str) -> PhasePatterns {
    let wanted = phase.trim();
    PHASES
        .iter()
        .find(|p| p.phase.eq_ignore_ascii_case(wanted))
        .copied()
        .unwrap_or(DEFAULT_PHASE)
}

/// Names of all recognized phases
pub fn known_phases() -> impl Iterator<Item = &'static str> {
    PHASES.iter().map(|p| p.phase)
}
