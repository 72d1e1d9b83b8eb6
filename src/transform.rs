use crate::collection::PCollection;

/// A composite transform.
///
/// `expand` describes the transform's internal pipeline in terms of other
/// transforms and stages. It only builds graph nodes; execution happens when
/// the resulting collection is collected.
pub trait PTransform<I, O> {
    fn expand(&self, input: PCollection<I>) -> PCollection<O>;
}

impl<T, I, O> PTransform<I, O> for &T
where
    T: PTransform<I, O> + ?Sized,
{
    fn expand(&self, input: PCollection<I>) -> PCollection<O> {
        (**self).expand(input)
    }
}
