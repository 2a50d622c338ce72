use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct CogFlags: u32 {
        const DEBUG       = 0x1;
        const DISABLED    = 0x2;
        const PULSE_SET   = 0x4;
        const TIMER_SET   = 0x8;
        const PAUSED      = 0x10;
        const LOCAL       = 0x40;
        const SERVER      = 0x80;
        const GLOBAL      = 0x100;
        const NO_SYNC     = 0x200;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CogSymbolType {
    Int,
    Flex,
    Thing,
    Template,
    Sector,
    Surface,
    Keyframe,
    Sound,
    Cog,
    Material,
    Vector,
    Model,
    AiClass,
    Message,
}

/// A symbol of a COG script. Non-local, non-message symbols take one initial
/// value per script instance, stored in the vtable under the instance's vtid.
#[derive(Debug, Clone)]
pub struct CogSymbol {
    pub name: String,
    pub kind: CogSymbolType,
    pub is_local: bool,
    pub vtable: HashMap<u32, String>,
}

impl CogSymbol {
    pub fn new(name: impl Into<String>, kind: CogSymbolType) -> Self {
        CogSymbol {
            name: name.into(),
            kind,
            is_local: false,
            vtable: HashMap::new(),
        }
    }

    /// Whether this symbol consumes one serialized value per instance.
    pub fn takes_value(&self) -> bool {
        !self.is_local && self.kind != CogSymbolType::Message
    }
}

#[derive(Debug, Clone, Default)]
pub struct CogScript {
    pub name: String,
    pub flags: CogFlags,
    pub symbols: Vec<CogSymbol>,
    next_vtid: u32,
}

impl CogScript {
    pub fn new(name: impl Into<String>) -> Self {
        CogScript {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn next_vtable_id(&mut self) -> u32 {
        let vtid = self.next_vtid;
        self.next_vtid += 1;
        vtid
    }

    /// The number of serialized values one instance of this script carries.
    pub fn value_count(&self) -> usize {
        self.symbols.iter().filter(|s| s.takes_value()).count()
    }
}

pub type SharedScript = Rc<RefCell<CogScript>>;

/// Insertion-ordered script table, looked up by script file name.
#[derive(Debug, Clone, Default)]
pub struct CogScriptTable {
    scripts: Vec<SharedScript>,
    by_name: HashMap<String, usize>,
}

impl CogScriptTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, script: CogScript) -> SharedScript {
        let name = script.name.clone();
        let shared = Rc::new(RefCell::new(script));
        self.by_name.insert(name, self.scripts.len());
        self.scripts.push(Rc::clone(&shared));
        shared
    }

    pub fn get(&self, name: &str) -> Option<&SharedScript> {
        self.by_name.get(name).map(|&idx| &self.scripts[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedScript> {
        self.scripts.iter()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// A script instance: binds a shared script's symbols to initial values
/// through a per-instance vtable id.
#[derive(Debug, Clone)]
pub struct Cog {
    pub id: usize,
    pub script: SharedScript,
    pub flags: CogFlags,
    pub vtid: u32,
}

impl Cog {
    pub fn name(&self) -> String {
        self.script.borrow().name.clone()
    }

    /// The instance's initial values in symbol order.
    pub fn values(&self) -> Vec<String> {
        self.script
            .borrow()
            .symbols
            .iter()
            .filter(|s| s.takes_value())
            .map(|s| s.vtable.get(&self.vtid).cloned().unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_count_skips_locals_and_messages() {
        let mut script = CogScript::new("door.cog");
        script.symbols.push(CogSymbol::new("door", CogSymbolType::Thing));
        script.symbols.push(CogSymbol::new("startup", CogSymbolType::Message));
        let mut local = CogSymbol::new("speed", CogSymbolType::Flex);
        local.is_local = true;
        script.symbols.push(local);
        assert_eq!(script.value_count(), 1);
    }

    #[test]
    fn vtable_ids_are_unique() {
        let mut script = CogScript::new("elev.cog");
        assert_ne!(script.next_vtable_id(), script.next_vtable_id());
    }
}
