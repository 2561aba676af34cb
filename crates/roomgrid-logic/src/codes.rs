//! Cell type codes used in floor grids.
//!
//! Codes are short string tokens (one letter in every building drawn so far).
//! Empty cells are `None` in the grid and never carry a code.

pub mod cell_types {
    // Structure
    pub const WALL: &str = "W";
    pub const OUTLINE: &str = "B";
    // Spaces
    pub const ADMIN: &str = "A";
    pub const CLASSROOM: &str = "C";
    pub const LAB: &str = "L";
    pub const OFFICE: &str = "O";
    pub const STUDENT: &str = "S";
    pub const GENERAL: &str = "G";
    pub const CIRCULATION: &str = "R"; // stairs and elevators

    /// Every code the viewer legend knows about.
    pub const ALL: [&str; 9] = [
        WALL,
        OUTLINE,
        ADMIN,
        CLASSROOM,
        LAB,
        OFFICE,
        STUDENT,
        GENERAL,
        CIRCULATION,
    ];

    /// Display name for a code, as shown in the viewer legend.
    pub fn name(code: &str) -> &'static str {
        match code {
            WALL => "Wall",
            OUTLINE => "Outline",
            ADMIN => "Admin",
            CLASSROOM => "Classroom",
            LAB => "Lab",
            OFFICE => "Office",
            STUDENT => "Student",
            GENERAL => "General",
            CIRCULATION => "Circulation",
            _ => "Unknown",
        }
    }

    /// Returns true if this code marks structure rather than usable space
    pub fn is_structural(code: &str) -> bool {
        matches!(code, WALL | OUTLINE)
    }

    /// Returns true if this code is a known code
    pub fn is_known(code: &str) -> bool {
        ALL.contains(&code)
    }
}

/// Set of codes that never form regions. Empty cells are always boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundarySet {
    codes: Vec<String>,
}

impl BoundarySet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        codes.sort();
        codes.dedup();
        Self { codes }
    }

    /// True for empty cells and for any listed code.
    pub fn contains(&self, cell: Option<&str>) -> bool {
        match cell {
            None => true,
            Some(code) => self.codes.iter().any(|c| c == code),
        }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

impl Default for BoundarySet {
    /// Walls and outlines.
    fn default() -> Self {
        Self::new([cell_types::WALL, cell_types::OUTLINE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_boundary_excludes_walls_and_empty() {
        let b = BoundarySet::default();
        assert!(b.contains(None));
        assert!(b.contains(Some("W")));
        assert!(b.contains(Some("B")));
        assert!(!b.contains(Some("C")));
        assert!(!b.contains(Some("G")));
    }

    #[test]
    fn test_custom_boundary_dedups() {
        let b = BoundarySet::new(["G", "W", "G"]);
        assert_eq!(b.codes(), &["G".to_string(), "W".to_string()]);
        assert!(b.contains(Some("G")));
        assert!(!b.contains(Some("B")));
    }

    #[test]
    fn test_names() {
        assert_eq!(cell_types::name("L"), "Lab");
        assert_eq!(cell_types::name("R"), "Circulation");
        assert_eq!(cell_types::name("?"), "Unknown");
        assert!(cell_types::is_structural("B"));
        assert!(!cell_types::is_structural("O"));
        assert!(cell_types::is_known("S"));
        assert!(!cell_types::is_known("X"));
    }
}
