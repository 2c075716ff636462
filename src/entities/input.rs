use serde::{Deserialize, Serialize};

/// One client input sample. `sequence` is client-assigned and monotonic;
/// the room echoes it back in `input_ack` with the resulting authoritative
/// position for client-side reconciliation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Input {
    pub forward: f32,
    pub strafe: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub jump: bool,
    pub crouch: bool,
    pub sequence: u32,
}

impl Input {
    pub fn clamped(&self) -> Input {
        Input {
            forward: self.forward.clamp(-1.0, 1.0),
            strafe: self.strafe.clamp(-1.0, 1.0),
            ..*self
        }
    }
}
