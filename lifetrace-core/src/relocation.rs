//! ## lifetrace-core::relocation
//! **Move/copy policy resolver**
//!
//! Whether relocating a value steals its state or duplicates it is decided per
//! type from the special members each level of its derivation chain declares.
//! The decision is made once, as an associated `const`, instead of being left
//! to implicit generation rules.
//!
//! Resolution walks from the most derived level towards the root:
//! - a user-provided move constructor resolves to [`RelocationPolicy::Move`]
//! - a defaulted move constructor moves member-wise, so the base level decides
//! - with no move constructor declared, declaring a destructor or any copy or
//!   move-assignment operation suppresses the implicit move and the level falls
//!   back to [`RelocationPolicy::Copy`]; otherwise the base level decides
//! - walking past the root means member-wise moves all the way down: `Move`
//!
//! | Type                    | Declares                          | Policy |
//! |-------------------------|-----------------------------------|--------|
//! | [`Resource`]            | destructor, copy, move            | Move   |
//! | [`DropOnlyDerived`]     | destructor                        | Copy   |
//! | [`MoveRestoredDerived`] | destructor, defaulted move        | Move   |

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::ledger::Ledger;
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelocationPolicy {
    /// Steals the source's state and leaves the source emptied.
    Move,
    /// Duplicates the source's state and leaves the source unchanged.
    Copy,
}

/// How a level of the chain declares its move constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDecl {
    /// Not declared; generated unless something suppresses it.
    Implicit,
    /// Explicitly requested as the member-wise default.
    Defaulted,
    /// Written by hand.
    UserProvided,
}

/// Special members declared by one level of a derivation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecialMembers {
    pub destructor: bool,
    pub copy_constructor: bool,
    pub copy_assignment: bool,
    pub move_assignment: bool,
    pub move_constructor: MoveDecl,
}

impl SpecialMembers {
    /// A level that declares nothing.
    pub const NONE: Self = Self {
        destructor: false,
        copy_constructor: false,
        copy_assignment: false,
        move_assignment: false,
        move_constructor: MoveDecl::Implicit,
    };

    pub const fn with_destructor(mut self) -> Self {
        self.destructor = true;
        self
    }

    pub const fn with_copy_constructor(mut self) -> Self {
        self.copy_constructor = true;
        self
    }

    pub const fn with_copy_assignment(mut self) -> Self {
        self.copy_assignment = true;
        self
    }

    pub const fn with_move_assignment(mut self) -> Self {
        self.move_assignment = true;
        self
    }

    pub const fn with_move_constructor(mut self, decl: MoveDecl) -> Self {
        self.move_constructor = decl;
        self
    }

    /// True when these declarations stop an implicit move constructor from
    /// being generated.
    pub const fn suppresses_implicit_move(&self) -> bool {
        self.destructor || self.copy_constructor || self.copy_assignment || self.move_assignment
    }
}

/// Resolves the relocation policy of the most derived level of `chain`.
///
/// `chain` is ordered root first.
pub const fn resolve(chain: &[SpecialMembers]) -> RelocationPolicy {
    let mut level = chain.len();
    while level > 0 {
        level -= 1;
        let members = chain[level];
        match members.move_constructor {
            MoveDecl::UserProvided => return RelocationPolicy::Move,
            MoveDecl::Defaulted => {}
            MoveDecl::Implicit => {
                if members.suppresses_implicit_move() {
                    return RelocationPolicy::Copy;
                }
            }
        }
    }
    RelocationPolicy::Move
}

/// A type whose relocation behaviour is fixed by its declared special members.
pub trait Relocatable: Clone {
    const NAME: &'static str;
    /// Declarations per level, root first, ending with this type.
    const MEMBERS: &'static [SpecialMembers];
    const POLICY: RelocationPolicy = resolve(Self::MEMBERS);

    /// The member-wise move. Only [`relocate`] decides whether it runs.
    fn move_construct(source: &mut Self) -> Self;
}

/// Relocates `source` into a new value according to `T::POLICY`.
///
/// Either way one construction is counted. Under `Move` the source is
/// emptied; under `Copy` it keeps its value and tag, so the two briefly
/// coexist as independent resources.
pub fn relocate<T: Relocatable>(source: &mut T) -> T {
    match T::POLICY {
        RelocationPolicy::Move => T::move_construct(source),
        RelocationPolicy::Copy => source.clone(),
    }
}

/// Declarations of the base level: destructor, copy and a hand-written move.
pub const RESOURCE_MEMBERS: SpecialMembers = SpecialMembers::NONE
    .with_destructor()
    .with_copy_constructor()
    .with_move_constructor(MoveDecl::UserProvided);

impl Relocatable for Resource {
    const NAME: &'static str = "Resource";
    const MEMBERS: &'static [SpecialMembers] = &[RESOURCE_MEMBERS];

    fn move_construct(source: &mut Self) -> Self {
        source.take()
    }
}

/// Derived level that adds no state and declares only a destructor.
#[derive(Debug, Clone)]
pub struct DropOnlyDerived {
    base: Resource,
}

impl DropOnlyDerived {
    pub fn new(ledger: &Rc<Ledger>, value: i32, tag: impl Into<String>) -> Self {
        Self {
            base: Resource::new(ledger, value, tag),
        }
    }

    pub fn with_default(ledger: &Rc<Ledger>) -> Self {
        Self {
            base: Resource::with_default(ledger),
        }
    }
}

impl Relocatable for DropOnlyDerived {
    const NAME: &'static str = "DropOnlyDerived";
    const MEMBERS: &'static [SpecialMembers] =
        &[RESOURCE_MEMBERS, SpecialMembers::NONE.with_destructor()];

    fn move_construct(source: &mut Self) -> Self {
        Self {
            base: source.base.take(),
        }
    }
}

/// Derived level that declares a destructor but asks for the default move
/// back.
#[derive(Debug, Clone)]
pub struct MoveRestoredDerived {
    base: Resource,
}

impl MoveRestoredDerived {
    pub fn new(ledger: &Rc<Ledger>, value: i32, tag: impl Into<String>) -> Self {
        Self {
            base: Resource::new(ledger, value, tag),
        }
    }

    pub fn with_default(ledger: &Rc<Ledger>) -> Self {
        Self {
            base: Resource::with_default(ledger),
        }
    }
}

impl Relocatable for MoveRestoredDerived {
    const NAME: &'static str = "MoveRestoredDerived";
    const MEMBERS: &'static [SpecialMembers] = &[
        RESOURCE_MEMBERS,
        SpecialMembers::NONE
            .with_destructor()
            .with_move_constructor(MoveDecl::Defaulted),
    ];

    fn move_construct(source: &mut Self) -> Self {
        Self {
            base: source.base.take(),
        }
    }
}

macro_rules! derive_base_access {
    ($($ty:ty),*) => {$(
        impl Deref for $ty {
            type Target = Resource;

            fn deref(&self) -> &Resource {
                &self.base
            }
        }

        impl DerefMut for $ty {
            fn deref_mut(&mut self) -> &mut Resource {
                &mut self.base
            }
        }

        impl AsRef<Resource> for $ty {
            fn as_ref(&self) -> &Resource {
                &self.base
            }
        }
    )*};
}

derive_base_access!(DropOnlyDerived, MoveRestoredDerived);

const _: () = assert!(matches!(Resource::POLICY, RelocationPolicy::Move));
const _: () = assert!(matches!(DropOnlyDerived::POLICY, RelocationPolicy::Copy));
const _: () = assert!(matches!(MoveRestoredDerived::POLICY, RelocationPolicy::Move));

/// Resolver output for the three types of the chain.
pub fn policy_table() -> [(&'static str, RelocationPolicy); 3] {
    [
        (Resource::NAME, Resource::POLICY),
        (DropOnlyDerived::NAME, DropOnlyDerived::POLICY),
        (MoveRestoredDerived::NAME, MoveRestoredDerived::POLICY),
    ]
}
