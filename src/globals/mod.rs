use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("unknown global variable: {name}")]
pub struct UnknownGlobal {
    pub name: String,
}

type GlobalsResult<T> = Result<T, UnknownGlobal>;

/// Named global variables, one table per scalar width.
///
/// The four kinds mirror the field descriptors: S (16-bit signed),
/// C (16-bit unsigned), I (32-bit signed), J (64-bit signed). A variable
/// must be declared with `add_*` before `get_*`/`set_*` can touch it;
/// re-declaring overwrites. Declarations happen once at load time, get/set
/// are driven by the getstatic/putstatic opcodes.
#[derive(Debug, Default, Serialize)]
pub struct GlobalVariablesArea {
    shorts: HashMap<String, i16>,
    chars: HashMap<String, u16>,
    ints: HashMap<String, i32>,
    longs: HashMap<String, i64>,
}

macro_rules! accessors {
    ($add:ident, $set:ident, $get:ident, $table:ident, $ty:ty) => {
        pub fn $add(&mut self, name: impl Into<String>, value: $ty) {
            self.$table.insert(name.into(), value);
        }

        pub fn $set(&mut self, name: &str, value: $ty) -> GlobalsResult<()> {
            match self.$table.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(UnknownGlobal { name: name.to_string() }),
            }
        }

        pub fn $get(&self, name: &str) -> GlobalsResult<$ty> {
            self.$table
                .get(name)
                .copied()
                .ok_or_else(|| UnknownGlobal { name: name.to_string() })
        }
    };
}

impl GlobalVariablesArea {
    pub fn new() -> Self {
        GlobalVariablesArea::default()
    }

    accessors!(add_short, set_short, get_short, shorts, i16);
    accessors!(add_char, set_char, get_char, chars, u16);
    accessors!(add_int, set_int, get_int, ints, i32);
    accessors!(add_long, set_long, get_long, longs, i64);
}
