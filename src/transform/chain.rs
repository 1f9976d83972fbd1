use super::Transform;
use crate::vector::Vector4;

/// An ordered composition of transforms, applied left to right. Nested
/// chains are flattened at construction. The chain as a whole is
/// identity iff every child is.
#[derive(Debug)]
pub struct ChainedTransform {
    steps: Vec<Box<dyn Transform>>,
    identity: bool,
}

impl ChainedTransform {
    pub fn new(steps: Vec<Box<dyn Transform>>) -> Self {
        let identity = steps.iter().all(|s| s.is_identity());
        ChainedTransform { steps, identity }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transform for ChainedTransform {
    fn is_identity(&self) -> bool {
        self.identity
    }

    fn transform(&self, v: Vector4) -> Vector4 {
        if self.identity {
            return v;
        }
        self.steps.iter().fold(v, |acc, step| step.transform(acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::MatrixTransform;
    use crate::vector::Matrix4;

    #[test]
    fn empty_chain_is_identity() {
        let chain = ChainedTransform::new(vec![]);
        assert!(chain.is_identity());
        let v = Vector4::new(0.1, 0.2, 0.3, 1.0);
        assert_eq!(chain.transform(v), v);
    }

    #[test]
    fn chain_of_identities_is_identity() {
        let chain = ChainedTransform::new(vec![
            Box::new(MatrixTransform::identity()),
            Box::new(MatrixTransform::identity()),
        ]);
        assert!(chain.is_identity());
    }

    #[test]
    fn chain_applies_steps_in_order() {
        let scale2 = MatrixTransform::new(Matrix4::from_rows4x4(&[
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]));
        let scale3 = MatrixTransform::new(Matrix4::from_rows4x4(&[
            [3.0, 0.0, 0.0, 0.0],
            [0.0, 3.0, 0.0, 0.0],
            [0.0, 0.0, 3.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]));
        let chain = ChainedTransform::new(vec![Box::new(scale2), Box::new(scale3)]);
        assert!(!chain.is_identity());
        let out = chain.transform(Vector4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(out.x, 6.0);
    }
}
