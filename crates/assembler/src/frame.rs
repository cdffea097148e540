//! The level-indexed frame stack of one assembly.
//!
//! Level 0 is the empty sentinel (no frames). Exactly one object may ever
//! occupy level 1.

use weaver_core::{Member, ObjectRef, ScopeId, StructureError, TypeId, Value};

/// One in-progress object.
#[derive(Debug)]
pub(crate) struct Frame {
    pub type_id: TypeId,
    pub instance: Option<ObjectRef>,
    /// The instance was supplied by the caller.
    pub supplied: bool,
    /// Placeholder opened by get-object on an existing member value.
    pub get_object: bool,
    pub collection: Option<ObjectRef>,
    pub member: Option<Member>,
    pub values: Vec<Value>,
    /// Value a get-object retrieved from the open member.
    pub retrieved: Option<Value>,
    pub name: Option<String>,
    pub arguments: Vec<String>,
    pub scope: Option<ScopeId>,
}

impl Frame {
    fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            instance: None,
            supplied: false,
            get_object: false,
            collection: None,
            member: None,
            values: Vec::new(),
            retrieved: None,
            name: None,
            arguments: Vec::new(),
            scope: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct FrameStack {
    frames: Vec<Frame>,
    max_depth: usize,
    root_closed: bool,
}

impl FrameStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
            root_closed: false,
        }
    }

    pub fn level(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// The frame directly below the current one.
    pub fn parent(&self) -> Option<&Frame> {
        self.frames.iter().rev().nth(1)
    }

    pub fn root(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Open a frame for `type_id` one level up.
    pub fn open(&mut self, type_id: &TypeId) -> Result<&mut Frame, StructureError> {
        match self.frames.last() {
            None if self.root_closed => {
                return Err(StructureError::RootAlreadyClosed {
                    type_name: type_id.to_string(),
                });
            }
            None => {}
            Some(current) if current.member.is_none() => {
                return Err(if self.frames.len() == 1 {
                    StructureError::SecondRoot {
                        type_name: type_id.to_string(),
                        root: current.type_id.to_string(),
                    }
                } else {
                    StructureError::ObjectWithoutMember {
                        type_name: type_id.to_string(),
                        parent: current.type_id.to_string(),
                    }
                });
            }
            Some(_) => {}
        }

        if self.frames.len() >= self.max_depth {
            return Err(StructureError::TooDeep {
                max_depth: self.max_depth,
            });
        }

        let index = self.frames.len();
        self.frames.push(Frame::new(type_id.clone()));
        Ok(&mut self.frames[index])
    }

    /// Pop the current frame.
    pub fn close(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        if self.frames.is_empty() {
            self.root_closed = true;
        }
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(name: &str) -> TypeId {
        TypeId::new(name)
    }

    #[test]
    fn child_requires_open_member() {
        let mut stack = FrameStack::new(8);
        stack.open(&ty("Window")).unwrap();

        let err = stack.open(&ty("TextBlock")).unwrap_err();
        assert!(matches!(err, StructureError::SecondRoot { .. }));

        stack.current_mut().unwrap().member = Some(Member::standard("Window", "Content"));
        stack.open(&ty("Grid")).unwrap();
        assert_eq!(stack.level(), 2);
        assert_eq!(stack.parent().unwrap().type_id, ty("Window"));

        let err = stack.open(&ty("TextBlock")).unwrap_err();
        assert!(matches!(err, StructureError::ObjectWithoutMember { .. }));
    }

    #[test]
    fn only_one_root_per_stream() {
        let mut stack = FrameStack::new(8);
        stack.open(&ty("Window")).unwrap();
        stack.close().unwrap();
        let err = stack.open(&ty("Window")).unwrap_err();
        assert!(matches!(err, StructureError::RootAlreadyClosed { .. }));
        assert!(stack.close().is_none());
    }

    #[test]
    fn depth_is_bounded() {
        let mut stack = FrameStack::new(2);
        stack.open(&ty("A")).unwrap().member = Some(Member::standard("A", "Child"));
        stack.open(&ty("B")).unwrap().member = Some(Member::standard("B", "Child"));
        let err = stack.open(&ty("C")).unwrap_err();
        assert!(matches!(err, StructureError::TooDeep { max_depth: 2 }));
    }
}
