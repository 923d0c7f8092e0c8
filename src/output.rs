use std::cell::RefCell;
use std::io;
use std::rc::Rc;

/// In-memory `print` sink whose clones share one buffer.
///
/// Hand one clone to [`Interpreter::with_output`](crate::interpreter::Interpreter::with_output)
/// and keep another to read what the program printed.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer {
    data: Rc<RefCell<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.borrow()).into_owned()
    }

    /// Drain the buffer, returning its contents.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.data.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
