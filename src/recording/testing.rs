//! Test double for the raw media capture handle.

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::MediaDevice;

pub(crate) struct FakeDevice {
    grant_permission: bool,
    fail_prompt: bool,
}

impl FakeDevice {
    pub fn granting() -> Self {
        Self {
            grant_permission: true,
            fail_prompt: false,
        }
    }

    pub fn denying() -> Self {
        Self {
            grant_permission: false,
            fail_prompt: false,
        }
    }

    pub fn failing_prompt() -> Self {
        Self {
            grant_permission: false,
            fail_prompt: true,
        }
    }
}

#[async_trait]
impl MediaDevice for FakeDevice {
    async fn request_permission(&mut self) -> Result<bool> {
        if self.fail_prompt {
            bail!("injected permission prompt failure");
        }
        Ok(self.grant_permission)
    }

    async fn begin_capture(&mut self) -> Result<()> {
        Ok(())
    }

    async fn end_capture(&mut self) -> Result<()> {
        Ok(())
    }
}
