use std::fmt;

/// Grant (`CAN`) or deny (`CANNOT`)
///
/// Stored on policies as a raw code so that malformed role documents can be
/// detected when the ability is compiled instead of when the role is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Can,
    Cannot,
}

impl Allowance {
    pub const CAN: &'static str = "CAN";
    pub const CANNOT: &'static str = "CANNOT";

    /// Exact, case-sensitive match; anything else is `None`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            Self::CAN => Some(Allowance::Can),
            Self::CANNOT => Some(Allowance::Cannot),
            _ => None,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Allowance::Can => Self::CAN,
            Allowance::Cannot => Self::CANNOT,
        }
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Allowance::from_code("CAN"), Some(Allowance::Can));
        assert_eq!(Allowance::from_code("CANNOT"), Some(Allowance::Cannot));
        assert_eq!(Allowance::from_code("can"), None);
        assert_eq!(Allowance::from_code("MAYBE"), None);
        assert_eq!(Allowance::from_code(""), None);
    }
}
