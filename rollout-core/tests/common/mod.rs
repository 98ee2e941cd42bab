//! Toy environment and policies shared by the integration tests.
#![allow(dead_code)]
use anyhow::Result;
use ndarray::{arr1, ArrayD};
use rollout_core::sampler::{Env, Policy, Step};

/// A walk on a line from 0 to `goal`.
///
/// The action is added to the position and the reward is `-1` per step.
/// The episode terminates on reaching the goal.
pub struct LineWalk {
    pub goal: f32,
    pos: f32,
}

impl LineWalk {
    pub fn new(goal: f32) -> Self {
        Self { goal, pos: 0.0 }
    }

    fn obs(&self) -> ArrayD<f32> {
        arr1(&[self.pos, self.goal - self.pos]).into_dyn()
    }
}

impl Env for LineWalk {
    fn reset(&mut self) -> Result<ArrayD<f32>> {
        self.pos = 0.0;
        Ok(self.obs())
    }

    fn step(&mut self, act: &ArrayD<f32>) -> Result<Step> {
        self.pos += act[[0]];
        Ok(Step::new(self.obs(), -1.0, self.pos >= self.goal))
    }
}

/// Moves by a fixed amount.
pub struct Constant(pub f32);

impl Policy for Constant {
    fn sample(&mut self, _obs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        Ok(arr1(&[self.0]).into_dyn())
    }
}

/// Moves by 1, carrying the number of steps taken as its hidden state.
#[derive(Default)]
pub struct Counting {
    n: f32,
}

impl Policy for Counting {
    fn reset(&mut self) {
        self.n = 0.0;
    }

    fn sample(&mut self, _obs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        self.n += 1.0;
        Ok(arr1(&[1.0]).into_dyn())
    }

    fn hidden_state(&self) -> Option<ArrayD<f32>> {
        Some(arr1(&[self.n]).into_dyn())
    }
}
