use crate::runtime::{
    data_structures::byte_buffer::{Buffer, ByteBuffer, ByteBufferPtr},
    error::{self, script_error_with_code_str, ThrowCode},
    interpreter::Interpreter,
};

/// Width in bytes of a single data-space cell.  `ALLOT`/`,`/`CREATE` all deal in cells of this
/// size; `align` rounds `here` up to a multiple of it.
const CELL_SIZE: usize = 8;

/// A data-space with no configured upper bound.  `--data-space-size` overrides this at startup;
/// without it the space behaves as it always has, growing to fit whatever is allotted.
const UNBOUNDED: usize = usize::MAX;

/// The interpreter's single, shared data-space.  Backs `CREATE`d words, `ALLOT`, `,`, and the raw
/// `@`/`!` byte addressed fetch/store words.  Grows by simple bump allocation; there is no reclaim
/// other than `ALLOT`ing a negative amount to shrink back towards the last high-water mark, which
/// is exactly what `MARKER` uses to roll the whole space back.
pub struct DataSpace {
    buffer: ByteBufferPtr,

    /// Fixed upper bound on `here`.  `allot` fails rather than growing past this.  Defaults to
    /// unbounded; set once at startup via `set_limit`.
    end: usize,
}

impl DataSpace {
    /// Create a new, empty, unbounded data-space.
    pub fn new() -> DataSpace {
        DataSpace {
            buffer: ByteBuffer::new_ptr(0),
            end: UNBOUNDED,
        }
    }

    /// The address one past the last byte currently allocated.  This is where the next `CREATE`d
    /// word's data field, or the next `,`'d cell, will land.
    pub fn here(&self) -> usize {
        self.buffer.borrow().len()
    }

    /// The configured upper bound on `here`, or `usize::MAX` if unbounded.
    pub fn limit(&self) -> usize {
        self.end
    }

    /// Set the fixed upper bound `allot` is allowed to grow the space to.  Used by
    /// `--data-space-size` to actually enforce the requested size instead of merely pre-touching
    /// the buffer.
    pub fn set_limit(&mut self, limit: usize) {
        self.end = limit;
    }

    /// Grow or shrink the data-space by `count` bytes, returning the address of the start of the
    /// newly allocated region.  A negative count shrinks the space back towards zero.
    ///
    /// Fails with `ThrowCode::DataSpaceAllocateFailure` if growing would push `here` past the
    /// configured `end`, or `ThrowCode::DataSpaceResizeFailure` if shrinking would take `here`
    /// below zero.
    ///
    /// Takes `&self`: the underlying buffer is reference counted and interior mutable, so callers
    /// can grow or shrink the space through a shared reference the same way `fetch`/`store` read
    /// and write it, without fighting the borrow checker over a `&mut DataSpace` held alongside a
    /// separate `&dyn Interpreter` needed for error reporting.
    pub fn allot(&self, interpreter: &dyn Interpreter, count: i64) -> error::Result<usize> {
        let current = self.here();

        let new_size = if count >= 0 {
            let grown = current.checked_add(count as usize);

            match grown {
                Some(size) if size <= self.end => size,

                _ => {
                    return script_error_with_code_str(
                        interpreter,
                        ThrowCode::DataSpaceAllocateFailure,
                        "Data-space allocation would exceed its configured size.",
                    );
                }
            }
        } else {
            let shrink_by = (-count) as usize;

            if shrink_by > current {
                return script_error_with_code_str(
                    interpreter,
                    ThrowCode::DataSpaceResizeFailure,
                    "Data-space allot would shrink below the base of the space.",
                );
            }

            current - shrink_by
        };

        self.buffer.borrow_mut().resize(new_size);
        Ok(current)
    }

    /// Advance `here` to the next cell boundary, returning the new, aligned `here`.  `CREATE` and
    /// `,` keep the space cell aligned so cell sized fetch/store never straddles a boundary.
    pub fn align(&self, interpreter: &dyn Interpreter) -> error::Result<usize> {
        let current = self.here();
        let remainder = current % CELL_SIZE;

        if remainder != 0 {
            self.allot(interpreter, (CELL_SIZE - remainder) as i64)?;
        }

        Ok(self.here())
    }

    /// Align, then reserve a single cell's worth of space for a freshly `CREATE`d word's DOES>
    /// continuation slot, returning the address of the word's data field (i.e. the address just
    /// past the reserved cell).
    pub fn word_create(&self, interpreter: &dyn Interpreter) -> error::Result<usize> {
        self.align(interpreter)?;
        let base = self.allot(interpreter, CELL_SIZE as i64)?;

        Ok(base + CELL_SIZE)
    }

    /// Align, then compile (append) a single cell's worth of an integer value, returning the
    /// address it was written to.  This is the data-space primitive behind the `,` word and
    /// `CREATE`'s compiled literals.
    pub fn word_append(&self, interpreter: &dyn Interpreter, value: i64) -> error::Result<usize> {
        self.align(interpreter)?;
        let address = self.allot(interpreter, CELL_SIZE as i64)?;

        self.buffer.borrow_mut().set_position(address);
        self.buffer.borrow_mut().write_int(CELL_SIZE, value);

        Ok(address)
    }

    /// Compile (append) a single cell's worth of an integer value, returning the address it was
    /// written to.  This is the data-space primitive behind the `,` word.
    pub fn comma(&self, interpreter: &dyn Interpreter, value: i64) -> error::Result<usize> {
        self.word_append(interpreter, value)
    }

    /// Fetch a cell sized integer value from the given address.
    pub fn fetch(&self, interpreter: &dyn Interpreter, address: usize) -> error::Result<i64> {
        if address + 8 > self.here() {
            return script_error_with_code_str(
                interpreter,
                ThrowCode::InvalidFilePosition,
                "Data-space fetch is out of bounds.",
            );
        }

        self.buffer.borrow_mut().set_position(address);
        Ok(self.buffer.borrow_mut().read_int(8, true))
    }

    /// Store a cell sized integer value at the given address.
    pub fn store(
        &self,
        interpreter: &dyn Interpreter,
        address: usize,
        value: i64,
    ) -> error::Result<()> {
        if address + 8 > self.here() {
            return script_error_with_code_str(
                interpreter,
                ThrowCode::InvalidFilePosition,
                "Data-space store is out of bounds.",
            );
        }

        self.buffer.borrow_mut().set_position(address);
        self.buffer.borrow_mut().write_int(8, value);
        Ok(())
    }

    /// Fetch a single byte from the given address.
    pub fn fetch_byte(&self, interpreter: &dyn Interpreter, address: usize) -> error::Result<i64> {
        if address >= self.here() {
            return script_error_with_code_str(
                interpreter,
                ThrowCode::InvalidFilePosition,
                "Data-space fetch is out of bounds.",
            );
        }

        self.buffer.borrow_mut().set_position(address);
        Ok(self.buffer.borrow_mut().read_int(1, false))
    }

    /// Store a single byte at the given address.
    pub fn store_byte(
        &self,
        interpreter: &dyn Interpreter,
        address: usize,
        value: i64,
    ) -> error::Result<()> {
        if address >= self.here() {
            return script_error_with_code_str(
                interpreter,
                ThrowCode::InvalidFilePosition,
                "Data-space store is out of bounds.",
            );
        }

        self.buffer.borrow_mut().set_position(address);
        self.buffer.borrow_mut().write_int(1, value);
        Ok(())
    }

    /// The underlying byte buffer, for bulk or byte level access.
    pub fn buffer(&self) -> ByteBufferPtr {
        self.buffer.clone()
    }
}

impl Default for DataSpace {
    fn default() -> Self {
        Self::new()
    }
}
