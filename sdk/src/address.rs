use propdispatch_schema::code_to_string;
use std::fmt;

pub type ObjectId = u32;
pub type Pid = i32;

pub const UNKNOWN_OBJECT_ID: ObjectId = 0;
/// Reserved for the plug-in object itself; allocated ids start above it.
pub const PLUGIN_OBJECT_ID: ObjectId = 1;

pub const SCOPE_GLOBAL: u32 = u32::from_be_bytes(*b"glob");
pub const SCOPE_INPUT: u32 = u32::from_be_bytes(*b"inpt");
pub const SCOPE_OUTPUT: u32 = u32::from_be_bytes(*b"outp");
pub const SCOPE_PLAY_THROUGH: u32 = u32::from_be_bytes(*b"ptru");
pub const ELEMENT_MAIN: u32 = 0;

/// (selector, scope, element) tuple routing a property query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyAddress {
    pub selector: u32,
    pub scope:    u32,
    pub element:  u32,
}

impl PropertyAddress {
    pub fn new(selector: u32, scope: u32, element: u32) -> Self {
        PropertyAddress { selector, scope, element }
    }

    /// Address in the global scope on the main element.
    pub fn global(selector: u32) -> Self {
        PropertyAddress::new(selector, SCOPE_GLOBAL, ELEMENT_MAIN)
    }
}

impl fmt::Display for PropertyAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}}}",
            code_to_string(self.selector),
            code_to_string(self.scope),
            self.element
        )
    }
}
