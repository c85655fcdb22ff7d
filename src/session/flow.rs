//! The end-to-end operator flow.

use super::checklist::safety_checklist;
use super::prompt::Prompter;
use super::SessionError;
use crate::collection::{Collector, EntropySource};
use crate::config::FileConfig;
use crate::keygen::{
    Identity, KeyGenerator, KeyMaterialProducer, KeyringImporter, OpenPgpConverter, OpenPgpPacket,
};
use crate::mixing::{Bip39Encoder, EntropyMixer, MixedSecret, MnemonicEncoder};
use std::io::{BufRead, Write};

/// Counts the operator chose at the start of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPlan {
    /// Keys to generate.
    pub keys: usize,
    /// Dice rolls per key.
    pub dice_rolls: usize,
    /// Computer-entropy bytes per key.
    pub entropy_bytes: usize,
    /// Number of OS samples to display.
    pub entropy_strings: usize,
}

impl SessionPlan {
    /// Bytes per displayed sample, rounded up so the samples together
    /// cover at least `entropy_bytes`.
    pub fn bytes_per_sample(&self) -> usize {
        self.entropy_bytes.div_ceil(self.entropy_strings.max(1))
    }
}

/// One interactive session over a prompter.
pub struct Session<'a, R, W> {
    prompter: Prompter<R, W>,
    config: &'a FileConfig,
    mixer: EntropyMixer,
    mnemonic: Box<dyn MnemonicEncoder + 'a>,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(prompter: Prompter<R, W>, config: &'a FileConfig) -> Self {
        Self {
            prompter,
            config,
            mixer: EntropyMixer::new(),
            mnemonic: Box::new(Bip39Encoder::new()),
        }
    }

    /// Replaces the BIP-39 encoder used to display each secret.
    pub fn with_mnemonic_encoder(mut self, encoder: impl MnemonicEncoder + 'a) -> Self {
        self.mnemonic = Box::new(encoder);
        self
    }

    /// Runs the whole flow: plan, checklist, collection, deposit and
    /// per-key generation. Returns the packets that were produced.
    pub fn run<G, S>(
        &mut self,
        source: &mut S,
        producer: &KeyMaterialProducer<G>,
        converter: &dyn OpenPgpConverter,
        importer: &dyn KeyringImporter,
    ) -> Result<Vec<OpenPgpPacket>, SessionError>
    where
        G: KeyGenerator,
        S: EntropySource + ?Sized,
    {
        let plan = self.plan()?;
        safety_checklist(&mut self.prompter)?;
        self.collect(&plan, source)?;
        let secrets = self.deposit(&plan)?;
        self.generate_keys(&secrets, producer, converter, importer)
    }

    /// Asks for the session counts. Minimums come from the config.
    pub fn plan(&mut self) -> Result<SessionPlan, SessionError> {
        let entropy = &self.config.entropy;
        let keys = self
            .prompter
            .integer("how many keys do you want to generate? ", 1)?;
        let dice_rolls = self.prompter.integer(
            "how many dicerolls do you want to do? ",
            entropy.min_dice_rolls,
        )?;
        let entropy_bytes = self.prompter.integer(
            "how many bytes (two hexadecimal chars) entropy do you want? ",
            entropy.min_entropy_bytes,
        )?;
        let entropy_strings = self.prompter.integer(
            "how many times do you want to query the OS to get your entropy? ",
            1,
        )?;

        let plan = SessionPlan {
            keys,
            dice_rolls,
            entropy_bytes,
            entropy_strings,
        };
        tracing::info!(?plan, "Session planned");
        Ok(plan)
    }

    /// Displays OS entropy samples for transcription.
    pub fn collect<S: EntropySource + ?Sized>(
        &mut self,
        plan: &SessionPlan,
        source: &mut S,
    ) -> Result<(), SessionError> {
        let mut collector = Collector::new(source);
        collector.sample(
            plan.entropy_strings,
            plan.bytes_per_sample(),
            self.prompter.output(),
        )?;
        Ok(())
    }

    /// Reads dice and computer entropy for every key and mixes them.
    ///
    /// Each secret is listed as hex and as a mnemonic. The mnemonic is
    /// for the operator's paper copy only.
    pub fn deposit(&mut self, plan: &SessionPlan) -> Result<Vec<MixedSecret>, SessionError> {
        let mut secrets = Vec::with_capacity(plan.keys);

        while secrets.len() < plan.keys {
            self.prompter
                .say(&format!("\nCreating private key #{}", secrets.len() + 1))?;

            let dice = self.prompter.dice_seed(plan.dice_rolls)?;
            let computer = self.prompter.computer_seed(plan.entropy_bytes)?;
            secrets.push(self.mixer.mix(&dice, &computer)?);
        }

        self.prompter.say("Private keys created.")?;
        self.prompter.say("Private keys:")?;
        for (idx, secret) in secrets.iter().enumerate() {
            self.prompter
                .say(&format!("Key #{}: {}", idx + 1, secret.as_hex()))?;
            let words = self.mnemonic.encode(&secret.to_bytes())?;
            self.prompter.say(&format!("mnemonic key: {words}"))?;
        }

        Ok(secrets)
    }

    /// Generates one OpenPGP key per secret and offers to import it.
    pub fn generate_keys<G: KeyGenerator>(
        &mut self,
        secrets: &[MixedSecret],
        producer: &KeyMaterialProducer<G>,
        converter: &dyn OpenPgpConverter,
        importer: &dyn KeyringImporter,
    ) -> Result<Vec<OpenPgpPacket>, SessionError> {
        let mut packets = Vec::with_capacity(secrets.len());

        for (idx, secret) in secrets.iter().enumerate() {
            self.prompter
                .say(&format!("\nGenerating key #{} of {}", idx + 1, secrets.len()))?;
            let name = self.prompter.line("Name: ")?;
            let email = self.prompter.line("Email: ")?;
            let identity = Identity::new(name, email);

            let (packet, material) =
                producer.generate(&identity, secret.seed_material(), converter)?;
            self.prompter.say(&format!(
                "key generated for {identity} ({} of {} keystream bytes used)",
                material.bytes_consumed(),
                material.capacity()
            ))?;

            if self
                .prompter
                .yes_no("are you sure you want to import the new key into gpg? (y/n) ")?
            {
                producer.import(&packet, importer)?;
                self.prompter.say("key imported")?;
            }
            packets.push(packet);
        }

        Ok(packets)
    }

    /// Returns the prompter.
    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }
}
