// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Given/When/Then block transitions and their boundary hooks.

use crate::{
    engine::Engine,
    error::Result,
    hook::HookType,
    step::BlockType,
};

impl Engine {
    /// Switches the open scenario to `target`, firing the block-boundary
    /// hooks of the outgoing and incoming blocks while the scenario is still
    /// healthy.
    ///
    /// Once the status leaves `Ok`, block hooks are permanently suppressed
    /// for the rest of the scenario, but the block bookkeeping itself keeps
    /// going. The [`BlockType::None`] sentinel never gets boundary hooks:
    /// neither as the outgoing initial state nor as the incoming final one.
    ///
    /// # Errors
    ///
    /// If a block-boundary hook raises. The block transition itself is
    /// recorded regardless.
    pub(crate) fn switch_block(&mut self, target: BlockType) -> Result<()> {
        let Some((current, healthy)) = self
            .scenario
            .as_ref()
            .map(|s| (s.current_block, s.status.is_ok()))
        else {
            return Ok(());
        };
        if current == target {
            return Ok(());
        }

        let outgoing = if healthy && current != BlockType::None {
            self.fire_hooks(HookType::AfterScenarioBlock)
        } else {
            Ok(())
        };

        if let Some(scenario) = self.scenario.as_mut() {
            scenario.current_block = target;
        }

        // A failing AfterScenarioBlock hook has escalated the status by now,
        // which suppresses the incoming hook as well.
        let still_healthy =
            self.scenario.as_ref().is_some_and(|s| s.status.is_ok());
        let incoming = if still_healthy && target != BlockType::None {
            self.fire_hooks(HookType::BeforeScenarioBlock)
        } else {
            Ok(())
        };

        outgoing.and(incoming)
    }
}
