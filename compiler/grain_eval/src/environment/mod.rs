//! Layered scope stack for field resolution.
//!
//! A name resolves through four layers in fixed priority:
//!
//! 1. **output**: fields written by the running body
//! 2. **input**: fields of the frame's input value
//! 3. **module**: strong writes that persist for the module
//! 4. **application**: host-provided bindings
//!
//! Block frames see through to their enclosing frames up to the nearest call
//! frame; a call frame hides its caller entirely. The environment is plain
//! owned data: spawning a thread clones it, so later writes on either side
//! stay invisible to the other.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use grain_ir::{ModuleId, Name, WriteStrength};
use grain_value::{Field, Structure, Value};

/// Whether a frame isolates its bindings from the frames beneath it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FrameKind {
    /// Overload call or default evaluation. Lookups stop here.
    Call,
    /// Nested block or inline target. Lookups fall through.
    Block,
}

/// One layer of the stack.
#[derive(Clone, Debug)]
pub struct Frame {
    pub kind: FrameKind,
    /// Module whose persistent layer this frame reads and writes.
    pub module: ModuleId,
    input: Value,
    output: SmallVec<[(Name, Value); 4]>,
}

impl Frame {
    pub fn call(module: ModuleId, input: Value) -> Self {
        Frame {
            kind: FrameKind::Call,
            module,
            input,
            output: SmallVec::new(),
        }
    }

    pub fn block(module: ModuleId, input: Value) -> Self {
        Frame {
            kind: FrameKind::Block,
            module,
            input,
            output: SmallVec::new(),
        }
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    fn output_value(&self, name: Name) -> Option<&Value> {
        self.output.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    fn input_value(&self, name: Name) -> Option<&Value> {
        self.input.as_structure()?.get(name)
    }

    fn bind(&mut self, name: Name, value: Value) {
        match self.output.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.output.push((name, value)),
        }
    }
}

/// Which layer a lookup was satisfied from.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Layer {
    Output,
    Input,
    Module,
    Application,
}

/// Scope stack plus the persistent module and application layers.
#[derive(Clone, Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    modules: FxHashMap<ModuleId, FxHashMap<Name, Value>>,
    application: FxHashMap<Name, Value>,
}

impl Environment {
    /// Environment with a root call frame for `module` and a void input.
    pub fn new(module: ModuleId) -> Self {
        Environment {
            frames: vec![Frame::call(module, Value::Void)],
            modules: FxHashMap::default(),
            application: FxHashMap::default(),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the top frame. The root frame is never popped.
    #[inline]
    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// Module of the running frame.
    pub fn module(&self) -> ModuleId {
        self.top().map_or(ModuleId::CORE, |f| f.module)
    }

    /// Input of the running frame.
    pub fn input(&self) -> Value {
        self.top().map(|f| f.input.clone()).unwrap_or_default()
    }

    /// Replace the running frame's input, returning the previous one.
    pub fn replace_input(&mut self, input: Value) -> Value {
        match self.top_mut() {
            Some(frame) => std::mem::replace(&mut frame.input, input),
            None => Value::Void,
        }
    }

    /// Output written so far in the running frame, as named fields.
    pub fn output(&self) -> Structure {
        self.top()
            .map(|f| {
                f.output
                    .iter()
                    .map(|(name, value)| Field::named(*name, value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Frames a lookup may see: the top frame down to the nearest call frame.
    fn visible_frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        let mut done = false;
        self.frames.iter().rev().take_while(move |frame| {
            if done {
                return false;
            }
            done = frame.kind == FrameKind::Call;
            true
        })
    }

    /// Resolve a name and report the layer that bound it.
    pub fn resolve(&self, name: Name) -> Option<(Layer, &Value)> {
        for frame in self.visible_frames() {
            if let Some(value) = frame.output_value(name) {
                return Some((Layer::Output, value));
            }
            if let Some(value) = frame.input_value(name) {
                return Some((Layer::Input, value));
            }
        }
        if let Some(value) = self
            .modules
            .get(&self.module())
            .and_then(|bindings| bindings.get(&name))
        {
            return Some((Layer::Module, value));
        }
        self.application
            .get(&name)
            .map(|value| (Layer::Application, value))
    }

    /// Value bound to `name`, or `None` when it is undefined in every layer.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.resolve(name).map(|(_, value)| value.clone())
    }

    /// Bind `name` according to `strength`. Returns whether a binding was made.
    ///
    /// Local writes go to the running frame, strong writes to the module
    /// layer, and weak writes to the running frame only when the name does
    /// not resolve yet.
    pub fn write(&mut self, name: Name, value: Value, strength: WriteStrength) -> bool {
        match strength {
            WriteStrength::Local => {
                if let Some(frame) = self.top_mut() {
                    frame.bind(name, value);
                }
                true
            }
            WriteStrength::Strong => {
                let module = self.module();
                self.modules.entry(module).or_default().insert(name, value);
                true
            }
            WriteStrength::Weak => {
                if self.resolve(name).is_some() {
                    return false;
                }
                if let Some(frame) = self.top_mut() {
                    frame.bind(name, value);
                }
                true
            }
        }
    }

    /// Host binding visible from every module.
    pub fn define_application(&mut self, name: Name, value: Value) {
        self.application.insert(name, value);
    }

    /// Seed a module's persistent layer.
    pub fn define_module(&mut self, module: ModuleId, name: Name, value: Value) {
        self.modules.entry(module).or_default().insert(name, value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(ModuleId::CORE)
    }
}
