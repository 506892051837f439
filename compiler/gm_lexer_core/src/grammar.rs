//! Compiled grammars: named states of ordered rules.
//!
//! A [`Grammar`] is built once through [`GrammarBuilder`], which compiles every
//! pattern, resolves state names to dense [`StateId`]s and rejects malformed
//! definitions up front. After that it is immutable, `Send + Sync`, and can be
//! shared by any number of concurrent scanners.
//!
//! # Includes
//!
//! `Include` rules are never flattened into their owning state. The effective
//! rule list of a state is produced lazily by [`RulesView`], which expands
//! includes in place as it goes. An include whose target is already being
//! expanded further up the path is skipped: every rule it would contribute
//! has already been offered at this point, so mutual includes terminate
//! without changing which rule wins.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::GrammarError;
use crate::rule::{Action, Rule, RuleDef, RuleLocation, StackOp};

/// Dense index of a state within its grammar.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named lexical context with its own ordered rules.
#[derive(Clone, Debug)]
pub struct State {
    id: StateId,
    name: String,
    rules: Vec<Rule>,
}

impl State {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rules declared directly in this state, includes unexpanded.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The effective rule list, includes expanded in place.
    pub fn rules_view<'g>(&self, grammar: &'g Grammar) -> RulesView<'g> {
        grammar.rules_view(self.id)
    }
}

/// An immutable set of states with a designated root.
#[derive(Clone, Debug)]
pub struct Grammar {
    name: String,
    states: Vec<State>,
    names: FxHashMap<String, StateId>,
    root: StateId,
}

impl Grammar {
    pub fn builder(root: impl Into<String>) -> GrammarBuilder {
        GrammarBuilder::new(root)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state every scan starts in.
    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.names.get(name).copied()
    }

    /// Look up a state by id.
    ///
    /// Ids are only meaningful for the grammar that issued them; an id from
    /// another grammar may panic or name an unrelated state.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    /// All states in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The effective rule list of `id`, includes expanded lazily.
    pub fn rules_view(&self, id: StateId) -> RulesView<'_> {
        let mut frames = SmallVec::new();
        frames.push(Frame { state: id, next: 0 });
        RulesView {
            grammar: self,
            frames,
        }
    }
}

/// Declarative grammar definition, compiled by [`GrammarBuilder::build`].
#[derive(Clone, Debug)]
pub struct GrammarBuilder {
    name: String,
    root: String,
    states: Vec<(String, Vec<RuleDef>)>,
}

impl GrammarBuilder {
    pub fn new(root: impl Into<String>) -> Self {
        GrammarBuilder {
            name: String::new(),
            root: root.into(),
            states: Vec::new(),
        }
    }

    /// Human-readable grammar name, used in logs.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare a state. Rule order is match priority.
    #[must_use]
    pub fn state(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = RuleDef>) -> Self {
        self.states.push((name.into(), rules.into_iter().collect()));
        self
    }

    /// Resolve names, compile patterns and validate every rule.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut names = FxHashMap::default();
        names.reserve(self.states.len());
        for (index, (name, _)) in self.states.iter().enumerate() {
            let id = StateId(u32::try_from(index).map_err(|_| GrammarError::TooManyStates)?);
            if names.insert(name.clone(), id).is_some() {
                return Err(GrammarError::DuplicateState(name.clone()));
            }
        }
        let root = *names
            .get(&self.root)
            .ok_or_else(|| GrammarError::UndeclaredRoot(self.root.clone()))?;

        let mut states = Vec::with_capacity(self.states.len());
        for (name, defs) in self.states {
            let id = names[&name];
            let mut rules = Vec::with_capacity(defs.len());
            for (index, def) in defs.into_iter().enumerate() {
                let location = RuleLocation {
                    state: name.clone(),
                    index,
                };
                rules.push(compile_rule(def, id, &names, location)?);
            }
            states.push(State { id, name, rules });
        }

        tracing::debug!(
            grammar = %self.name,
            states = states.len(),
            rules = states.iter().map(|s| s.rules.len()).sum::<usize>(),
            "grammar built"
        );

        Ok(Grammar {
            name: self.name,
            states,
            names,
            root,
        })
    }
}

fn compile_rule(
    def: RuleDef,
    owner: StateId,
    names: &FxHashMap<String, StateId>,
    location: RuleLocation,
) -> Result<Rule, GrammarError> {
    let resolve = |target: String| match names.get(&target) {
        Some(&id) => Ok(id),
        None => Err(GrammarError::UndeclaredTarget {
            location: location.clone(),
            target,
        }),
    };

    match def {
        Rule::Token {
            pattern,
            action,
            stack,
        } => {
            let stack = stack.try_map(resolve)?;
            let pattern = pattern
                .compile()
                .map_err(|source| GrammarError::InvalidPattern {
                    location: location.clone(),
                    source,
                })?;
            if let Action::EmitGroups(kinds) = &action {
                if kinds.len() != pattern.group_count() {
                    return Err(GrammarError::GroupArity {
                        location,
                        kinds: kinds.len(),
                        groups: pattern.group_count(),
                    });
                }
            }
            Ok(Rule::Token {
                pattern,
                action,
                stack,
            })
        }
        Rule::Include {
            stack: StackOp::Push(_) | StackOp::Pop | StackOp::Goto(_),
            ..
        } => Err(GrammarError::IncludeStackOp(location)),
        Rule::Include { state: target, .. } => {
            let id = resolve(target)?;
            if id == owner {
                return Err(GrammarError::SelfInclude(location));
            }
            Ok(Rule::Include {
                state: id,
                stack: StackOp::None,
            })
        }
        Rule::Default(StackOp::None) => Err(GrammarError::InertDefault(location)),
        Rule::Default(stack) => Ok(Rule::Default(stack.try_map(resolve)?)),
    }
}

/// A rule reached through [`RulesView`], with the state that declares it.
#[derive(Copy, Clone, Debug)]
pub struct RuleEntry<'g> {
    /// State whose rule list holds `rule` (an included state, possibly).
    pub state: StateId,
    /// Position of `rule` within that state's declared rules.
    pub index: usize,
    pub rule: &'g Rule,
}

impl RuleEntry<'_> {
    pub fn location(&self, grammar: &Grammar) -> RuleLocation {
        RuleLocation {
            state: grammar.state(self.state).name().to_owned(),
            index: self.index,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Frame {
    state: StateId,
    next: usize,
}

/// Lazy iterator over a state's effective rules.
///
/// Yields `Token` and `Default` rules only; includes are expanded, not
/// yielded.
#[derive(Clone, Debug)]
pub struct RulesView<'g> {
    grammar: &'g Grammar,
    /// Expansion path, outermost state first.
    frames: SmallVec<[Frame; 4]>,
}

impl<'g> Iterator for RulesView<'g> {
    type Item = RuleEntry<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let grammar = self.grammar;
        loop {
            let frame = self.frames.last_mut()?;
            let state = frame.state;
            let index = frame.next;
            let Some(rule) = grammar.state(state).rules.get(index) else {
                self.frames.pop();
                continue;
            };
            frame.next += 1;

            match rule {
                Rule::Include { state: target, .. } => {
                    let on_path = self.frames.iter().any(|f| f.state == *target);
                    if !on_path {
                        self.frames.push(Frame {
                            state: *target,
                            next: 0,
                        });
                    }
                }
                Rule::Token { .. } | Rule::Default(_) => {
                    return Some(RuleEntry { state, index, rule });
                }
            }
        }
    }
}

impl std::iter::FusedIterator for RulesView<'_> {}
