mod backoff;

pub use backoff::BackoffStack;

use crate::error::EmptyStackError;

pub trait ConcurrentStack<V> {
    fn new() -> Self;
    fn push(&self, value: V);
    // non-blocking pop that fails when the stack is observed as empty.
    fn pop(&self) -> Result<V, EmptyStackError>;
}

// simple sequential stack
#[derive(Debug)]
pub struct Stack<V> {
    head: Option<Box<Node<V>>>,
    len: usize,
}

#[derive(Debug)]
struct Node<V> {
    value: V,
    next: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    fn new(value: V) -> Node<V> {
        Node { value, next: None }
    }
}

impl<V> Stack<V> {
    pub fn new() -> Stack<V> {
        Stack { head: None, len: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn top(&self) -> Option<&V> {
        self.head.as_ref().map(|node| &node.value)
    }

    pub fn push(&mut self, value: V) {
        let mut node = Box::new(Node::new(value));

        node.next = self.head.take();
        self.head = Some(node);
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<V> {
        let mut top = self.head.take()?;

        self.head = top.next.take();
        self.len -= 1;

        Some(top.value)
    }
}

impl<V: Clone> Clone for Stack<V> {
    fn clone(&self) -> Self {
        let mut values = Vec::with_capacity(self.len);
        let mut cur = self.head.as_deref();

        while let Some(node) = cur {
            values.push(node.value.clone());
            cur = node.next.as_deref();
        }

        let mut stack = Stack::new();
        for value in values.into_iter().rev() {
            stack.push(value);
        }

        stack
    }
}

impl<V> Default for Stack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for Stack<V> {
    fn drop(&mut self) {
        // unlink iteratively so that a deep stack does not overflow the call stack
        let mut cur = self.head.take();

        while let Some(mut node) = cur {
            cur = node.next.take();
        }
    }
}
