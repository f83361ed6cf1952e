//! Requisition (purchasing) groups offered to the operator at run start.

use serde::Serialize;

/// A purchasing group code and its operator-facing description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequisitionGroup {
    /// Menu key typed by the operator
    pub option: &'static str,
    pub code: &'static str,
    pub description: &'static str,
}

/// The fixed set of groups, in menu order
pub const REQUISITION_GROUPS: [RequisitionGroup; 7] = [
    RequisitionGroup {
        option: "1",
        code: "P01",
        description: "Recommendation",
    },
    RequisitionGroup {
        option: "2",
        code: "P02",
        description: "Item Return",
    },
    RequisitionGroup {
        option: "3",
        code: "P03",
        description: "Synergy",
    },
    RequisitionGroup {
        option: "4",
        code: "P04",
        description: "MRP",
    },
    RequisitionGroup {
        option: "5",
        code: "P05",
        description: "EO",
    },
    RequisitionGroup {
        option: "6",
        code: "P06",
        description: "IP / Projects",
    },
    RequisitionGroup {
        option: "7",
        code: "P07",
        description: "Scrap Replenishment",
    },
];

/// Menu key that ends the program
pub const EXIT_OPTION: &str = "0";

/// What the operator picked from the group menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelection {
    Group(RequisitionGroup),
    Exit,
}

impl GroupSelection {
    /// Interpret a menu key; `None` for anything not on the menu
    pub fn from_option(input: &str) -> Option<Self> {
        let input = input.trim();
        if input == EXIT_OPTION {
            return Some(Self::Exit);
        }
        REQUISITION_GROUPS
            .iter()
            .find(|g| g.option == input)
            .map(|g| Self::Group(*g))
    }
}

impl RequisitionGroup {
    /// Look up a group by its code (case-insensitive), e.g. `p04`
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        REQUISITION_GROUPS
            .iter()
            .find(|g| g.code.eq_ignore_ascii_case(code))
            .copied()
    }
}

impl std::fmt::Display for RequisitionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.description)
    }
}
