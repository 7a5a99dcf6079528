use proptest::prelude::*;

/// One step of a random workload over a small key space.
#[derive(Clone, Debug)]
pub enum Op {
    Add(u16, u16),
    Set(u16, u16),
    Remove(u16),
    PopFirst,
    PopLast,
    Bounds(u16),
    /// List-only: insert at the back instead of the front.
    Append(u16, u16),
    /// List-only: move the entry for this key to the front.
    Touch(u16),
}

pub fn ops() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u16..256;
    let op = prop_oneof![
        4 => (key.clone(), any::<u16>()).prop_map(|(k, v)| Op::Add(k, v)),
        2 => (key.clone(), any::<u16>()).prop_map(|(k, v)| Op::Set(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
        2 => key.clone().prop_map(Op::Bounds),
        3 => (key.clone(), any::<u16>()).prop_map(|(k, v)| Op::Append(k, v)),
        2 => key.prop_map(Op::Touch),
    ];
    prop::collection::vec(op, 0..400)
}

#[allow(dead_code)]
pub fn assert_eq_iters<I, J>(mut i: I, mut j: J)
where
    I: Iterator,
    J: Iterator<Item = I::Item>,
    I::Item: std::fmt::Debug + Eq,
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}
