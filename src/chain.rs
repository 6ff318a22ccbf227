//! # Chain
//! A chain is a unit that accepts one input value and produces one output value. Chains compose:
//!
//! * linearly via [ChainExt::pipe], so `a.pipe(b).pipe(c)` runs `c(b(a(x)))`;
//! * by named fan-out via [Parallel], which runs every branch on clones of the same input and
//!   maps each branch name to its result;
//! * by predicate dispatch via [Branch], which runs the first arm whose predicate matches the
//!   input, or a default arm when none does.
//!
//! Plain functions become chains through [stage]. [ChatTemplate](crate::prompt::ChatTemplate) and
//! [ChatModel](crate::utils::llm::openai::ChatModel) implement [Chain] directly, so
//! `template.pipe(model)` is the usual head of a pipeline.
//!
//! There is no retry, timeout or partial-result handling here: an error in any stage aborts the
//! whole pipeline and surfaces unmodified.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::message::Message;
use crate::prompt::ChatTemplate;

/// A pipeline stage: one input in, one output out. Each invocation is independent; a stage owns no
/// per-invocation mutable state.
#[async_trait]
pub trait Chain: Send + Sync {
    type Input: Send;
    type Output: Send;

    async fn run(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Composition helpers for every [Chain].
pub trait ChainExt: Chain + Sized {
    /// Feed the output of `self` into `next`. Composition is associative:
    /// `a.pipe(b).pipe(c)` and `a.pipe(b.pipe(c))` run the same stages in the same order.
    fn pipe<C>(self, next: C) -> Pipe<Self, C>
    where
        C: Chain<Input = Self::Output>,
    {
        Pipe { first: self, second: next }
    }
}

impl<T: Chain + Sized> ChainExt for T {}

/// Two chains glued end to end. Built via [ChainExt::pipe].
#[derive(Debug, Clone)]
pub struct Pipe<A, B> {
    first: A,
    second: B,
}

#[async_trait]
impl<A, B> Chain for Pipe<A, B>
where
    A: Chain,
    B: Chain<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    async fn run(&self, input: Self::Input) -> Result<Self::Output> {
        let intermediate = self.first.run(input).await?;
        self.second.run(intermediate).await
    }
}

#[async_trait]
impl<C> Chain for Box<C>
where
    C: Chain + ?Sized,
{
    type Input = C::Input;
    type Output = C::Output;

    async fn run(&self, input: Self::Input) -> Result<Self::Output> {
        (**self).run(input).await
    }
}

#[async_trait]
impl<C> Chain for Arc<C>
where
    C: Chain + ?Sized,
{
    type Input = C::Input;
    type Output = C::Output;

    async fn run(&self, input: Self::Input) -> Result<Self::Output> {
        (**self).run(input).await
    }
}

/// A chain made from a plain function. See [stage].
pub struct FnChain<F, I, O> {
    function: F,
    _marker: PhantomData<fn(I) -> O>,
}

/// Lift a plain fallible function into a [Chain] stage.
///
/// ```
/// use promptchain::chain::{stage, Chain, ChainExt};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let double = stage(|x: usize| Ok(x * 2));
/// let add_one = stage(|x: usize| Ok(x + 1));
/// assert_eq!(double.pipe(add_one).run(20).await.unwrap(), 41);
/// # });
/// ```
pub fn stage<F, I, O>(function: F) -> FnChain<F, I, O>
where
    F: Fn(I) -> Result<O> + Send + Sync,
    I: Send,
    O: Send,
{
    FnChain { function, _marker: PhantomData }
}

#[async_trait]
impl<F, I, O> Chain for FnChain<F, I, O>
where
    F: Fn(I) -> Result<O> + Send + Sync,
    I: Send,
    O: Send,
{
    type Input = I;
    type Output = O;

    async fn run(&self, input: I) -> Result<O> {
        (self.function)(input)
    }
}

/// Boxed chain type used by [Parallel] and [Branch] to hold heterogeneous sub-chains.
pub type BoxedChain<I, O> = Box<dyn Chain<Input = I, Output = O>>;

/// Named fan-out: every branch runs on a clone of the same input, and the output maps each branch
/// name to its result. The key set of the output always equals the set of configured branch names.
///
/// Branches execute one after another in insertion order; a branch failure aborts the whole fan-out
/// and surfaces that branch's error unmodified.
pub struct Parallel<I, O> {
    branches: Vec<(String, BoxedChain<I, O>)>,
}

impl<I, O> Parallel<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    pub fn new() -> Self {
        Self { branches: Vec::new() }
    }

    /// Add a named branch. A duplicate name overwrites the earlier branch's result in the output
    /// map; keep names distinct.
    pub fn branch(mut self, name: impl Into<String>, chain: impl Chain<Input = I, Output = O> + 'static) -> Self {
        self.branches.push((name.into(), Box::new(chain)));
        self
    }

    /// The configured branch names, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|(name, _)| name.as_str())
    }
}

impl<I, O> Default for Parallel<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, O> Chain for Parallel<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = HashMap<String, O>;

    async fn run(&self, input: I) -> Result<HashMap<String, O>> {
        let mut results = HashMap::with_capacity(self.branches.len());
        for (name, chain) in &self.branches {
            let output = chain.run(input.clone()).await?;
            results.insert(name.clone(), output);
        }
        Ok(results)
    }
}

type Predicate<I> = Box<dyn Fn(&I) -> bool + Send + Sync>;

/// First-match predicate dispatch: arms are scanned in insertion order and the first arm whose
/// predicate accepts the input runs; when none matches, the default arm runs. Predicates need not
/// be mutually exclusive.
pub struct Branch<I, O> {
    arms: Vec<(Predicate<I>, BoxedChain<I, O>)>,
    default: BoxedChain<I, O>,
}

impl<I, O> Branch<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    /// A branch always has a default arm, so dispatch is total.
    pub fn new(default: impl Chain<Input = I, Output = O> + 'static) -> Self {
        Self {
            arms: Vec::new(),
            default: Box::new(default),
        }
    }

    /// Add an arm guarded by a predicate. Earlier arms win over later ones.
    pub fn when(
        mut self,
        predicate: impl Fn(&I) -> bool + Send + Sync + 'static,
        chain: impl Chain<Input = I, Output = O> + 'static,
    ) -> Self {
        self.arms.push((Box::new(predicate), Box::new(chain)));
        self
    }
}

#[async_trait]
impl<I, O> Chain for Branch<I, O>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    async fn run(&self, input: I) -> Result<O> {
        for (predicate, chain) in &self.arms {
            if predicate(&input) {
                return chain.run(input).await;
            }
        }
        self.default.run(input).await
    }
}

/// A [ChatTemplate] is a stage from a key-value mapping to the rendered message sequence.
#[async_trait]
impl Chain for ChatTemplate {
    type Input = HashMap<String, String>;
    type Output = Vec<Message>;

    async fn run(&self, values: HashMap<String, String>) -> Result<Vec<Message>> {
        self.render(&values)
    }
}

#[cfg(test)]
mod test_chain {
    use std::collections::{HashMap, HashSet};

    use anyhow::anyhow;

    use crate::prompt::ChatTemplate;
    use super::{stage, Branch, Chain, ChainExt, Parallel};

    #[tokio::test]
    async fn test_pipe_order() {
        let chain = stage(|x: i64| Ok(x + 1)).pipe(stage(|x: i64| Ok(x * 10)));
        assert_eq!(chain.run(4).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_pipe_associativity() {
        let a = || stage(|x: i64| Ok(x + 1));
        let b = || stage(|x: i64| Ok(x * 10));
        let c = || stage(|x: i64| Ok(x - 3));
        let left = a().pipe(b()).pipe(c());
        let right = a().pipe(b().pipe(c()));
        for input in [-5i64, 0, 7] {
            assert_eq!(left.run(input).await.unwrap(), right.run(input).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_pipe_aborts_on_error() {
        let chain = stage(|_: i64| Err::<i64, _>(anyhow!("first stage failed")))
            .pipe(stage(|x: i64| Ok(x + 1)));
        let err = chain.run(1).await.err().unwrap();
        assert_eq!(err.to_string(), "first stage failed");
    }

    #[tokio::test]
    async fn test_parallel_preserves_key_set() {
        let fan_out = Parallel::new()
            .branch("double", stage(|x: i64| Ok(x * 2)))
            .branch("negate", stage(|x: i64| Ok(-x)))
            .branch("identity", stage(|x: i64| Ok(x)));
        let results = fan_out.run(21).await.unwrap();
        let keys: HashSet<&str> = results.keys().map(String::as_str).collect();
        assert_eq!(keys, HashSet::from(["double", "negate", "identity"]));
        assert_eq!(results["double"], 42);
        assert_eq!(results["negate"], -21);
        assert_eq!(results["identity"], 21);
    }

    #[tokio::test]
    async fn test_parallel_branch_failure_aborts() {
        let fan_out = Parallel::new()
            .branch("ok", stage(|x: i64| Ok(x)))
            .branch("broken", stage(|_: i64| Err::<i64, _>(anyhow!("branch failed"))));
        assert!(fan_out.run(1).await.is_err());
    }

    #[tokio::test]
    async fn test_branch_first_match_wins() {
        let dispatch = Branch::new(stage(|s: String| Ok(format!("default:{s}"))))
            .when(|s: &String| s.contains("a"), stage(|s: String| Ok(format!("first:{s}"))))
            .when(|s: &String| s.contains("ab"), stage(|s: String| Ok(format!("second:{s}"))));
        // both predicates hold for "ab", the earlier arm runs
        assert_eq!(dispatch.run("ab".to_string()).await.unwrap(), "first:ab");
        assert_eq!(dispatch.run("xyz".to_string()).await.unwrap(), "default:xyz");
    }

    #[tokio::test]
    async fn test_template_as_stage() {
        let template = ChatTemplate::new()
            .system("You are a helpful assistant.")
            .human("Tell me a fact about {[topic]}.");
        let chain = template.pipe(stage(|messages: Vec<crate::message::Message>| {
            Ok(messages.last().unwrap().content.clone())
        }));
        let values = HashMap::from([("topic".to_string(), "Rust".to_string())]);
        assert_eq!(chain.run(values).await.unwrap(), "Tell me a fact about Rust.");
    }
}
