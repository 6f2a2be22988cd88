/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Registries split the way the rest of the shell consumes them: atomic
//! registries own one primitive each (capabilities, commands, handlers,
//! views), domain registries compose them (layouts over views and anchors).

pub mod atomic;
pub mod domain;
