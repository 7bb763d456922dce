#[derive(Debug, Clone, Copy)]
pub enum StreamSignal {
    Stop,
}
