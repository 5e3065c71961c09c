use serde::{Deserialize, Serialize};
use station_core::{BitGrid, DisplaySetting, Engine, EngineError, GRID_SIZE};
use station_types::{
    BlockTarget, BoxId, DisplayKey, GameSnapshot, MemberId, Millis, Rgb, SessionState,
};
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Block request from the operator: stage the configuration, then activate it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockRequest {
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub permanent: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    pub debounce_window_ms: Option<Millis>,
    pub code_interval_ms: Option<Millis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMemberRequest {
    pub name: String,
    pub team: String,
    /// Defaults to the currently selected tag
    pub tag: Option<String>,
}

/// Partial edit of one display setting. Applied in order: color, grid, toggle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayUpdate {
    pub color: Option<Rgb>,
    pub grid: Option<[[u8; GRID_SIZE]; GRID_SIZE]>,
    pub toggle: Option<[usize; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("No tag given and none selected")]
    NoTagSelected,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Shares one engine between the link task, the tick task and the HTTP API.
/// Lines destined for the stations are queued on the outbound channel and
/// written by the link task.
pub struct StationManager {
    engine: Mutex<Engine>,
    outbound: mpsc::UnboundedSender<String>,
}

impl StationManager {
    pub fn new(engine: Engine) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            engine: Mutex::new(engine),
            outbound,
        };
        (manager, receiver)
    }

    /// Run a closure with exclusive access to the engine
    pub async fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let mut engine = self.engine.lock().await;
        f(&mut engine)
    }

    pub async fn dispatch_line(&self, line: &str) {
        let replies = self.engine.lock().await.dispatch(line);
        for reply in replies {
            self.send(reply);
        }
    }

    pub async fn tick(&self) -> Vec<BlockTarget> {
        let expired = self.engine.lock().await.tick();
        if !expired.is_empty() {
            debug!("{} block(s) expired", expired.len());
        }
        expired
    }

    fn send(&self, line: String) {
        if self.outbound.send(line).is_err() {
            warn!("Link writer is gone, dropping outbound line");
        }
    }

    // Session

    pub async fn start(&self, request: StartRequest) -> Result<SessionState, ManagerError> {
        let mut engine = self.engine.lock().await;
        engine.start(request.debounce_window_ms, request.code_interval_ms)?;
        Ok(engine.game().session.state().clone())
    }

    pub async fn pause(&self) -> SessionState {
        let mut engine = self.engine.lock().await;
        engine.pause();
        engine.game().session.state().clone()
    }

    pub async fn reset(&self) -> SessionState {
        let mut engine = self.engine.lock().await;
        engine.reset();
        engine.game().session.state().clone()
    }

    // Enrollment

    pub async fn select_tag(&self, tag: &str) -> Result<(), ManagerError> {
        if self.engine.lock().await.select_tag(tag) {
            Ok(())
        } else {
            Err(EngineError::TagNotFound(tag.to_string()).into())
        }
    }

    pub async fn add_team(&self, name: &str) -> bool {
        self.engine.lock().await.add_team(name)
    }

    pub async fn add_member(&self, request: NewMemberRequest) -> Result<MemberId, ManagerError> {
        let mut engine = self.engine.lock().await;
        let tag = match request.tag {
            Some(tag) => tag,
            None => engine
                .game()
                .selected_tag()
                .map(str::to_string)
                .ok_or(ManagerError::NoTagSelected)?,
        };

        let member_id = engine.assign(&request.name, &request.team, &tag)?;
        Ok(member_id)
    }

    // Blocks

    pub async fn block_box(
        &self,
        box_id: BoxId,
        request: BlockRequest,
    ) -> Result<(), ManagerError> {
        let line = {
            let mut engine = self.engine.lock().await;
            engine.stage_box_block(box_id, request.duration_seconds, request.permanent);
            engine.activate_box_block(box_id)?
        };
        info!("Box {} blocked by operator", box_id);
        self.send(line);
        Ok(())
    }

    pub async fn unblock_box(&self, box_id: BoxId) -> bool {
        self.engine.lock().await.deactivate_box_block(box_id)
    }

    pub async fn block_member(
        &self,
        member_id: MemberId,
        request: BlockRequest,
    ) -> Result<(), ManagerError> {
        let mut engine = self.engine.lock().await;
        engine.stage_member_block(member_id, request.duration_seconds, request.permanent)?;
        engine.activate_member_block(member_id)?;
        Ok(())
    }

    pub async fn unblock_member(&self, member_id: MemberId) -> Result<bool, ManagerError> {
        Ok(self.engine.lock().await.deactivate_member_block(member_id)?)
    }

    // Display

    pub async fn display_setting(&self, key: DisplayKey) -> DisplaySetting {
        self.engine.lock().await.display().get(key).clone()
    }

    pub async fn update_display(
        &self,
        key: DisplayKey,
        update: DisplayUpdate,
    ) -> Result<DisplaySetting, ManagerError> {
        // Reject before touching any field
        if key.is_digit() && (update.grid.is_some() || update.toggle.is_some()) {
            return Err(EngineError::ReadOnlyGrid(key).into());
        }
        if let Some([row, col]) = update.toggle
            && (row >= GRID_SIZE || col >= GRID_SIZE)
        {
            return Err(EngineError::CellOutOfRange { row, col }.into());
        }

        let mut engine = self.engine.lock().await;

        if let Some(color) = update.color {
            engine.set_display_color(key, color);
        }
        if let Some(bits) = update.grid {
            engine.set_display_grid(key, BitGrid::from_bits(bits))?;
        }
        if let Some([row, col]) = update.toggle {
            engine.toggle_display_cell(key, row, col)?;
        }

        Ok(engine.display().get(key).clone())
    }

    // Queries

    pub async fn snapshot(&self) -> GameSnapshot {
        self.engine.lock().await.snapshot()
    }

    pub async fn box_status(&self) -> Vec<bool> {
        self.engine.lock().await.box_status().to_vec()
    }

    pub async fn recent_lines(&self) -> Vec<String> {
        self.engine.lock().await.recent_lines()
    }
}
