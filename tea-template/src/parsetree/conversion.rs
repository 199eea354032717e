use serde::{Deserialize, Serialize};

use crate::types::{Type, TypeKind};

/// One coercion step applied on top of an expression's natural type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    from: Option<Type>,
    to: Type,
    cast_preferred: bool,
}

impl Conversion {
    pub fn new(from: Option<Type>, to: Type, cast_preferred: bool) -> Self {
        Self {
            from,
            to,
            cast_preferred,
        }
    }

    pub fn from_type(&self) -> Option<&Type> {
        self.from.as_ref()
    }

    pub fn to_type(&self) -> &Type {
        &self.to
    }

    pub fn is_cast_preferred(&self) -> bool {
        self.cast_preferred
    }
}

/// Result of applying a conversion to a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub chain: ConversionChain,
    /// The added steps unbox or re-type a nullable value.
    pub exception_possible: bool,
}

/// Ordered record of how an expression's natural type is coerced to the type
/// its context requires. The first step always starts from `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionChain {
    steps: Vec<Conversion>,
}

impl ConversionChain {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn from_steps(steps: Vec<Conversion>) -> Self {
        Self { steps }
    }

    /// A chain holding only the natural type. Cast is preferred so a later
    /// `set_initial_type` can insert steps in front of it.
    pub fn with_type(ty: Type) -> Self {
        Self {
            steps: vec![Conversion::new(None, ty, true)],
        }
    }

    pub fn steps(&self) -> &[Conversion] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ty(&self) -> Option<&Type> {
        self.steps.last().map(|conversion| &conversion.to)
    }

    pub fn initial_type(&self) -> Option<&Type> {
        self.steps.first().map(|conversion| &conversion.to)
    }

    /// Chain extended so that it ends in `to`, or `None` when no legal
    /// coercion exists.
    pub fn converted(&self, to: &Type, prefer_cast: bool) -> Option<Converted> {
        let mut builder = ChainBuilder::from(self);
        if builder.convert(to.clone(), prefer_cast) {
            Some(builder.finish())
        } else {
            None
        }
    }

    /// Shortest equivalent chain: round trips back to an earlier type are
    /// cancelled and primitive -> boxed -> String becomes primitive -> String.
    pub fn reduced(&self) -> ConversionChain {
        let mut steps = self.steps.clone();

        'cancel: loop {
            for from in 0..steps.len() {
                for to in (from + 1)..steps.len() {
                    if steps[from].to == steps[to].to {
                        steps.drain(from + 1..=to);
                        continue 'cancel;
                    }
                }
            }
            break;
        }

        let mut cursor = 0;
        while cursor < steps.len() {
            let mut ty = steps[cursor].to.clone();
            cursor += 1;
            while ty.is_primitive() && cursor < steps.len() {
                let next = steps[cursor].to.clone();
                cursor += 1;
                if ty.to_non_primitive() != next || cursor >= steps.len() {
                    ty = next;
                    continue;
                }
                let third = steps[cursor].to.clone();
                cursor += 1;
                if third.is_string_class() && !third.is_primitive() {
                    let direct = Conversion::new(Some(ty.clone()), third, false);
                    steps.splice(cursor - 2..cursor, [direct]);
                    cursor -= 1;
                } else {
                    ty = third;
                }
            }
        }

        ConversionChain { steps }
    }
}

struct ChainBuilder {
    steps: Vec<Conversion>,
    exception_possible: bool,
}

impl From<&ConversionChain> for ChainBuilder {
    fn from(chain: &ConversionChain) -> Self {
        Self {
            steps: chain.steps.clone(),
            exception_possible: false,
        }
    }
}

impl ChainBuilder {
    fn current(&self) -> Option<&Type> {
        self.steps.last().map(|conversion| &conversion.to)
    }

    fn push(&mut self, to: Type, cast_preferred: bool) {
        let from = self.current().cloned();
        if from.as_ref() != Some(&to) {
            self.steps.push(Conversion::new(from, to, cast_preferred));
        }
    }

    fn push_string(&mut self, to: &Type) {
        if to.is_non_null() {
            self.push(Type::non_null_string(), false);
        } else {
            self.push(Type::string(), false);
        }
    }

    fn note_unboxing(&mut self, from: &Type) {
        if from.is_nullable() {
            self.exception_possible = true;
        }
    }

    fn convert(&mut self, mut to: Type, mut prefer_cast: bool) -> bool {
        let Some(from) = self.current().cloned() else {
            self.push(to, prefer_cast);
            return true;
        };
        if from == to {
            return true;
        }
        if !prefer_cast && from.kind() == &TypeKind::Null {
            prefer_cast = true;
        }

        let mut legal = false;
        if from.is_primitive() {
            if to.is_primitive() {
                legal = !to.is_void();
            } else if to.class_assignable_from(&from) {
                legal = true;
                if to.kind() != from.kind() {
                    to = from.to_non_primitive();
                }
            } else if from.is_number_class() && to.has_primitive_peer() {
                if to.is_number_class() {
                    if !self.convert(to.to_primitive(), true) {
                        return false;
                    }
                    legal = true;
                } else if to.kind() == &TypeKind::Char {
                    if !self.convert(Type::char(), true) {
                        return false;
                    }
                    legal = true;
                }
            }
        } else if to.is_primitive() {
            if from.has_primitive_peer() {
                self.note_unboxing(&from);
                let unboxed = from.to_primitive();
                if unboxed.kind() != to.kind() && !self.convert(unboxed, true) {
                    return false;
                }
                legal = true;
            } else if from.is_number_class() && to.is_number_class() {
                self.note_unboxing(&from);
                legal = true;
            } else if prefer_cast {
                if !self.convert(to.to_non_primitive(), true) {
                    return false;
                }
                legal = true;
            }
        } else if from.class_assignable_from(&to) {
            // Down-cast.
            legal = prefer_cast;
        } else if to.class_assignable_from(&from) {
            // Up-cast. Nothing to record unless it narrows nullability.
            if from.is_non_null() || !to.is_non_null() {
                return true;
            }
            legal = true;
        } else if from.is_number_class() && to.is_number_class() && to.has_primitive_peer() {
            if from.is_non_null() && !self.convert(to.to_primitive(), true) {
                return false;
            }
            legal = true;
        } else if from.array_element_type().is_some()
            && to.array_element_type().is_some()
            && to.array_convertible_from(&from)
        {
            self.note_unboxing(&from);
            legal = true;
        }

        if !legal && to.accepts_string() {
            self.push_string(&to);
            legal = true;
        }

        if !legal
            && !prefer_cast
            && !from.is_primitive()
            && !to.is_primitive()
            && (from.class_assignable_from(&to) || to.class_assignable_from(&from))
        {
            legal = true;
        }

        if legal {
            self.push(to, prefer_cast);
        }
        legal
    }

    fn finish(self) -> Converted {
        Converted {
            chain: ConversionChain { steps: self.steps },
            exception_possible: self.exception_possible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(types: &[Type]) -> ConversionChain {
        let mut chain = ConversionChain::with_type(types[0].clone());
        for ty in &types[1..] {
            chain = chain.converted(ty, true).expect("legal conversion").chain;
        }
        chain
    }

    fn targets(chain: &ConversionChain) -> Vec<Type> {
        chain.steps().iter().map(|step| step.to_type().clone()).collect()
    }

    #[test]
    fn empty_chain_has_no_type() {
        let chain = ConversionChain::new();
        assert!(chain.ty().is_none());
        assert!(chain.initial_type().is_none());
    }

    #[test]
    fn converting_to_the_current_type_adds_nothing() {
        let chain = ConversionChain::with_type(Type::int());
        let converted = chain.converted(&Type::int(), true).unwrap();
        assert_eq!(converted.chain, chain);
    }

    #[test]
    fn widening_int_to_long_is_a_single_step() {
        let chain = chain_of(&[Type::int(), Type::long()]);
        assert_eq!(targets(&chain), vec![Type::int(), Type::long()]);
        assert_eq!(chain.initial_type(), Some(&Type::int()));
        assert_eq!(chain.ty(), Some(&Type::long()));
    }

    #[test]
    fn int_to_number_boxes_through_integer() {
        let chain = chain_of(&[Type::int(), Type::number()]);
        assert_eq!(
            targets(&chain),
            vec![Type::int(), Type::int().to_non_primitive()]
        );
    }

    #[test]
    fn int_to_boxed_long_goes_through_primitive_long() {
        let boxed_long = Type::long().to_non_primitive();
        let chain = chain_of(&[Type::int(), boxed_long.clone()]);
        assert_eq!(targets(&chain), vec![Type::int(), Type::long(), boxed_long]);
    }

    #[test]
    fn int_to_string_converts_directly() {
        let chain = chain_of(&[Type::int(), Type::string()]);
        assert_eq!(targets(&chain), vec![Type::int(), Type::string()]);
    }

    #[test]
    fn unboxing_a_nullable_value_may_throw() {
        let chain = ConversionChain::with_type(Type::int().to_non_primitive().to_nullable());
        let converted = chain.converted(&Type::int(), true).unwrap();
        assert!(converted.exception_possible);

        let chain = ConversionChain::with_type(Type::int().to_non_primitive());
        let converted = chain.converted(&Type::int(), true).unwrap();
        assert!(!converted.exception_possible);
    }

    #[test]
    fn upcast_without_nullability_change_records_nothing() {
        let chain = ConversionChain::with_type(Type::string());
        let converted = chain.converted(&Type::object(), true).unwrap();
        assert_eq!(converted.chain, chain);
    }

    #[test]
    fn primitive_to_void_is_illegal() {
        let chain = ConversionChain::with_type(Type::int());
        assert!(chain.converted(&Type::void(), true).is_none());
    }

    #[test]
    fn boolean_to_number_is_illegal() {
        let chain = ConversionChain::with_type(Type::boolean());
        assert!(chain.converted(&Type::number(), false).is_none());
    }

    #[test]
    fn reduce_cancels_round_trips() {
        let chain = chain_of(&[Type::int(), Type::long(), Type::int(), Type::double()]);
        let reduced = chain.reduced();
        assert_eq!(targets(&reduced), vec![Type::int(), Type::double()]);
    }

    #[test]
    fn reduce_collapses_boxing_before_string() {
        let boxed = Type::int().to_non_primitive();
        let chain = ConversionChain {
            steps: vec![
                Conversion::new(None, Type::int(), true),
                Conversion::new(Some(Type::int()), boxed.clone(), true),
                Conversion::new(Some(boxed), Type::string(), false),
            ],
        };
        let reduced = chain.reduced();
        assert_eq!(
            reduced.steps(),
            &[
                Conversion::new(None, Type::int(), true),
                Conversion::new(Some(Type::int()), Type::string(), false),
            ]
        );
    }

    #[test]
    fn reduce_is_idempotent_on_collapsed_chain() {
        let chain = chain_of(&[
            Type::int(),
            Type::int().to_non_primitive(),
            Type::string(),
            Type::object(),
        ]);
        let once = chain.reduced();
        assert_eq!(once.reduced(), once);
        assert!(once.len() <= chain.len());
    }
}
