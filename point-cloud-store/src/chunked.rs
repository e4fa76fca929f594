/// Growable array stored as a sequence of fixed-capacity chunks.
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::iter::{Iter, YieldingIter};
use crate::yielder::{CooperativeYield, NoYield, YieldBudget};
use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};
use tracing::{debug, trace};

/// Smallest reservation made when a growable chunk runs out of storage.
const MIN_GROWTH: usize = 8;

/// Mode of the final chunk. Every other chunk is always sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TailState {
    /// Stored length is final; the next `append_one` opens a new chunk.
    #[default]
    Sealed,
    /// Built by `append_one`. Storage may be reserved past `last_len`.
    Growable { last_len: usize },
}

/// Array-like container that never needs one contiguous allocation for all
/// of its elements.
///
/// Two ingestion paths share the same storage:
/// - [`append_batch`](Self::append_batch) adopts producer batches as whole
///   chunks, splitting batches larger than the chunk capacity;
/// - [`append_one`](Self::append_one) fills a growable tail chunk one element
///   at a time.
///
/// Index `i` lives in chunk `i / chunk_capacity` at offset
/// `i % chunk_capacity` as long as every non-terminal chunk is full. A short
/// batch followed by further appends leaves a short chunk in the interior;
/// lookups then go through the recorded chunk start offsets instead.
#[derive(Clone)]
pub struct ChunkedContainer<T> {
    chunk_capacity: usize,
    chunks: Vec<Vec<T>>,
    /// Logical index of the first element of each chunk.
    starts: Vec<usize>,
    len: usize,
    tail: TailState,
    /// True while some non-terminal chunk holds fewer than `chunk_capacity` elements.
    ragged: bool,
    yield_budget: YieldBudget,
}

impl<T> ChunkedContainer<T> {
    /// Empty container with the default yield interval. A zero capacity is clamped to 1.
    pub fn new(chunk_capacity: usize) -> Self {
        Self::with_config(&StoreConfig::default().with_chunk_capacity(chunk_capacity))
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            chunk_capacity: config.chunk_capacity.max(1),
            chunks: Vec::new(),
            starts: Vec::new(),
            len: 0,
            tail: TailState::Sealed,
            ragged: false,
            yield_budget: YieldBudget::new(config.yield_interval),
        }
    }

    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    pub fn yield_interval(&self) -> usize {
        self.yield_budget.interval()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn tail(&self) -> TailState {
        self.tail
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Logical contents of each chunk, in order. Meant for consumers that
    /// stream chunk by chunk, e.g. GPU uploads or parallel reductions.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &[T]> + DoubleEndedIterator + '_ {
        self.chunks.iter().map(Vec::as_slice)
    }

    /// Total element slots currently allocated across all chunks.
    pub fn allocated(&self) -> usize {
        self.chunks.iter().map(Vec::capacity).sum()
    }

    /// Resolve a possibly negative index to an absolute one inside `[0, len)`.
    fn resolve(&self, index: isize) -> Option<usize> {
        let len = isize::try_from(self.len).ok()?;
        let absolute = if index < 0 { index + len } else { index };
        if (0..len).contains(&absolute) {
            Some(absolute as usize)
        } else {
            None
        }
    }

    /// Chunk and in-chunk offset of an absolute index already known to be `< len`.
    fn locate(&self, absolute: usize) -> (usize, usize) {
        if !self.ragged {
            return (
                absolute / self.chunk_capacity,
                absolute % self.chunk_capacity,
            );
        }
        let chunk = self.starts.partition_point(|&start| start <= absolute) - 1;
        (chunk, absolute - self.starts[chunk])
    }

    fn get_absolute(&self, absolute: usize) -> Option<&T> {
        if absolute >= self.len {
            return None;
        }
        let (chunk, offset) = self.locate(absolute);
        self.chunks.get(chunk)?.get(offset)
    }

    fn get_absolute_mut(&mut self, absolute: usize) -> Option<&mut T> {
        if absolute >= self.len {
            return None;
        }
        let (chunk, offset) = self.locate(absolute);
        self.chunks.get_mut(chunk)?.get_mut(offset)
    }

    /// Element at `index`; `-1` is the last element. `None` outside `[-len, len)`.
    pub fn get(&self, index: isize) -> Option<&T> {
        self.get_absolute(self.resolve(index)?)
    }

    pub fn get_mut(&mut self, index: isize) -> Option<&mut T> {
        let absolute = self.resolve(index)?;
        self.get_absolute_mut(absolute)
    }

    /// Like [`get`](Self::get) but reports the failing index.
    pub fn try_get(&self, index: isize) -> Result<&T> {
        self.get(index).ok_or(StoreError::OutOfRange {
            index,
            len: self.len,
        })
    }

    /// Overwrite the element at `index` in place. The length never changes.
    pub fn set(&mut self, index: isize, value: T) -> Result<()> {
        let len = self.len;
        let slot = self
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    fn push_chunk(&mut self, chunk: Vec<T>) {
        if self
            .chunks
            .last()
            .is_some_and(|previous| previous.len() < self.chunk_capacity)
        {
            self.ragged = true;
        }
        self.starts.push(self.len);
        self.len += chunk.len();
        self.chunks.push(chunk);
    }

    /// Release storage reserved past the logical end of a growable tail.
    fn seal_tail(&mut self) {
        if let TailState::Growable { last_len } = mem::take(&mut self.tail) {
            if let Some(last) = self.chunks.last_mut() {
                debug_assert_eq!(last.len(), last_len);
                last.shrink_to_fit();
            }
            trace!(last_len, "sealed growable tail chunk");
        }
    }

    fn refresh_ragged(&mut self) {
        let capacity = self.chunk_capacity;
        self.ragged = self
            .chunks
            .split_last()
            .is_some_and(|(_, interior)| interior.iter().any(|chunk| chunk.len() < capacity));
    }

    /// Adopt a producer batch without cooperative yielding.
    /// See [`append_batch_with`](Self::append_batch_with).
    pub fn append_batch(&mut self, batch: Vec<T>, valid_len: Option<usize>) {
        self.append_batch_with(batch, valid_len, &mut NoYield);
    }

    /// Append the first `valid_len` elements of `batch` (all of it when `None`,
    /// clamped to the batch length) as one or more new sealed chunks.
    ///
    /// A batch that fits in one chunk and is used in full becomes that chunk
    /// as is, without copying. Larger batches are cut into
    /// `chunk_capacity`-sized pieces. `yielder` is called whenever the
    /// elements appended since the last yield reach the configured interval.
    ///
    /// The tail is always sealed afterwards, so a following `append_one`
    /// starts a fresh chunk.
    pub fn append_batch_with<Y>(&mut self, mut batch: Vec<T>, valid_len: Option<usize>, yielder: &mut Y)
    where
        Y: CooperativeYield + ?Sized,
    {
        let requested = valid_len.map_or(batch.len(), |n| n.min(batch.len()));
        if requested == 0 {
            return;
        }
        self.seal_tail();

        if requested == batch.len() && requested <= self.chunk_capacity {
            // no-op when the producer sized the batch exactly
            batch.shrink_to_fit();
            self.push_chunk(batch);
            if self.yield_budget.spend(requested) {
                yielder.yield_now();
            }
            debug!(elements = requested, chunks = 1, "adopted batch");
            return;
        }

        batch.truncate(requested);
        let mut source = batch.into_iter();
        let mut remaining = requested;
        let mut produced = 0;
        while remaining > 0 {
            let take = self.chunk_capacity.min(remaining);
            remaining -= take;
            let chunk: Vec<T> = source.by_ref().take(take).collect();
            if chunk.is_empty() {
                continue;
            }
            let size = chunk.len();
            self.push_chunk(chunk);
            produced += 1;
            if self.yield_budget.spend(size) {
                yielder.yield_now();
            }
        }
        debug!(elements = requested, chunks = produced, "split batch");
    }

    /// Append a single element to the growable tail, opening a new chunk when
    /// the tail is sealed or full. Returns the stored element.
    pub fn append_one(&mut self, value: T) -> &mut T {
        let capacity = self.chunk_capacity;
        let tail = self.tail;
        let last_len = match tail {
            TailState::Growable { last_len } if last_len < capacity && !self.chunks.is_empty() => {
                last_len
            }
            _ => {
                self.seal_tail();
                self.push_chunk(Vec::new());
                0
            }
        };

        let index = self.chunks.len() - 1;
        let chunk = &mut self.chunks[index];
        if chunk.len() == chunk.capacity() {
            // doubling, but never past the chunk capacity
            let grow = chunk.len().max(MIN_GROWTH).min(capacity - chunk.len());
            chunk.reserve_exact(grow);
        }
        chunk.push(value);
        self.tail = TailState::Growable {
            last_len: last_len + 1,
        };
        self.len += 1;
        &mut chunk[last_len]
    }

    /// Reconcile the tail chunk's storage with its logical length and seal it.
    /// An empty growable tail is dropped. Calling this twice is the same as once.
    pub fn trim_last_chunk(&mut self) {
        self.tail = TailState::Sealed;
        let Some(last) = self.chunks.last_mut() else {
            return;
        };

        if last.is_empty() {
            self.chunks.pop();
            self.starts.pop();
            self.refresh_ragged();
            debug!("dropped empty tail chunk");
        } else if last.len() < last.capacity() {
            let released = last.capacity() - last.len();
            last.shrink_to_fit();
            debug!(released, "trimmed tail chunk");
        }
    }

    /// Drop every element. The chunk capacity is kept.
    pub fn clear(&mut self) {
        self.chunks = Vec::new();
        self.starts = Vec::new();
        self.len = 0;
        self.tail = TailState::Sealed;
        self.ragged = false;
        self.yield_budget.reset();
    }

    /// Lazy in-order iteration over exactly `len` elements. Each call starts over.
    pub fn each(&self) -> Iter<'_, T> {
        Iter::new(&self.chunks, self.len)
    }

    /// Same sequence as [`each`](Self::each), calling `yielder` after every
    /// `every` elements. `None` uses the configured interval; `Some(0)` is
    /// treated as 1.
    pub fn each_yielding<Y: CooperativeYield>(
        &self,
        every: Option<usize>,
        yielder: Y,
    ) -> YieldingIter<'_, T, Y> {
        let every = every.unwrap_or_else(|| self.yield_interval()).max(1);
        YieldingIter::new(self.each(), every, yielder)
    }
}

impl<T> Default for ChunkedContainer<T> {
    fn default() -> Self {
        Self::with_config(&StoreConfig::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ChunkedContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.each()).finish()
    }
}

impl<T> Index<usize> for ChunkedContainer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get_absolute(index) {
            Some(value) => value,
            None => panic!(
                "index {index} out of range for container of length {}",
                self.len
            ),
        }
    }
}

impl<T> IndexMut<usize> for ChunkedContainer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_absolute_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for container of length {len}"),
        }
    }
}

impl<T> Extend<T> for ChunkedContainer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append_one(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a ChunkedContainer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.each()
    }
}
