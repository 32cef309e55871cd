//! Element-wise transform functions
//!
//! A [`DoFn`] turns one input element into zero, one or many outputs by
//! pushing them into an [`Emitter`]. Every transform in a plan, including
//! the key/value projections and type reinterpretation, is a `DoFn`.

use std::fmt;
use std::marker::PhantomData;
use strand_core::Result;

/// Output channel of a transform.
///
/// Owned by the executor; a `DoFn` only appends to it.
pub struct Emitter<T> {
    out: Vec<T>,
}

impl<T> Emitter<T> {
    /// Empty emitter
    pub fn new() -> Self {
        Emitter { out: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Emitter {
            out: Vec::with_capacity(capacity),
        }
    }

    /// Emit one output element
    pub fn emit(&mut self, value: T) {
        self.out.push(value);
    }

    /// Number of elements emitted so far
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Returns true if nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub(crate) fn into_inner(self) -> Vec<T> {
        self.out
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").field("emitted", &self.out.len()).finish()
    }
}

/// One input element to zero or more output elements.
///
/// The executor calls `initialize` once, `process` for every input element
/// in order, then `cleanup` once. Inputs are handed over by value; anything
/// a function keeps beyond the `process` call must be detached first.
pub trait DoFn<I, O>: Send + Sync {
    /// Called before the first element.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Process one element.
    fn process(&self, input: I, emitter: &mut Emitter<O>) -> Result<()>;

    /// Called after the last element; may emit trailing outputs.
    fn cleanup(&self, _emitter: &mut Emitter<O>) -> Result<()> {
        Ok(())
    }
}

/// `DoFn` backed by a closure.
pub struct FnDoFn<F, I, O> {
    f: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<F, I, O> DoFn<I, O> for FnDoFn<F, I, O>
where
    F: Fn(I, &mut Emitter<O>) -> Result<()> + Send + Sync,
{
    fn process(&self, input: I, emitter: &mut Emitter<O>) -> Result<()> {
        (self.f)(input, emitter)
    }
}

/// Wrap a closure as a `DoFn`.
///
/// ```
/// use strand_engine::dofn::{do_fn, Emitter};
///
/// let split = do_fn(|line: String, out: &mut Emitter<String>| {
///     for word in line.split_whitespace() {
///         out.emit(word.to_string());
///     }
///     Ok(())
/// });
/// # let _ = &split;
/// ```
pub fn do_fn<F, I, O>(f: F) -> FnDoFn<F, I, O>
where
    F: Fn(I, &mut Emitter<O>) -> Result<()> + Send + Sync,
{
    FnDoFn {
        f,
        _marker: PhantomData,
    }
}

/// Emits every input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFn;

impl<T> DoFn<T, T> for IdentityFn {
    fn process(&self, input: T, emitter: &mut Emitter<T>) -> Result<()> {
        emitter.emit(input);
        Ok(())
    }
}

/// Run `f` over `inputs`, collecting its outputs.
pub(crate) fn apply<I, O>(
    f: &dyn DoFn<I, O>,
    inputs: impl IntoIterator<Item = I>,
    capacity: usize,
) -> Result<Vec<O>> {
    let mut emitter = Emitter::with_capacity(capacity);
    f.initialize()?;
    for input in inputs {
        f.process(input, &mut emitter)?;
    }
    f.cleanup(&mut emitter)?;
    Ok(emitter.into_inner())
}
